use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{AiError, InferenceClient, InlineImage};

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

// --- wire types ---

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        inline_data: Blob,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct Blob {
    mime_type: String,
    /// Base64-encoded bytes.
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// --- client ---

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: API_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn build_request(prompt: &str, image: Option<InlineImage>) -> GenerateRequest {
        let mut parts = vec![Part::Text {
            text: prompt.to_string(),
        }];
        if let Some(image) = image {
            parts.push(Part::InlineData {
                inline_data: Blob {
                    mime_type: image.mime_type,
                    data: BASE64.encode(&image.data),
                },
            });
        }
        GenerateRequest {
            contents: vec![Content { parts }],
        }
    }

    fn extract_text(response: GenerateResponse) -> Result<String, AiError> {
        if let Some(error) = response.error {
            return Err(AiError::Api {
                status: 200,
                message: error.message,
            });
        }
        let part = response
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .and_then(|c| c.content)
            .and_then(|mut c| if c.parts.is_empty() { None } else { Some(c.parts.remove(0)) })
            .ok_or(AiError::Empty)?;
        match part {
            Part::Text { text } => Ok(text),
            Part::InlineData { .. } => Err(AiError::Empty),
        }
    }
}

#[async_trait]
impl InferenceClient for GeminiClient {
    #[instrument(skip(self, prompt, image), fields(model = %self.model))]
    async fn generate(&self, prompt: &str, image: Option<InlineImage>) -> Result<String, AiError> {
        let body = Self::build_request(prompt, image);

        debug!("sending generateContent request");
        let response = self.client.post(self.url()).json(&body).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GenerateResponse>(&text)
                .ok()
                .and_then(|r| r.error)
                .map_or_else(|| text.clone(), |e| e.message);
            error!(status = %status, "Gemini API error");
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)?;
        Self::extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn request_includes_prompt_and_inline_image() {
        let image = InlineImage {
            mime_type: "image/jpeg".into(),
            data: Bytes::from_static(b"abc"),
        };
        let req = GeminiClient::build_request("what is in this meal?", Some(image));
        let json = serde_json::to_value(&req).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "what is in this meal?");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], BASE64.encode(b"abc"));
    }

    #[test]
    fn text_only_request_has_a_single_part() {
        let req = GeminiClient::build_request("plan my week", None);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["contents"][0]["parts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn extracts_first_candidate_text() {
        let raw = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Rice - 200 calories"}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(
            GeminiClient::extract_text(parsed).unwrap(),
            "Rice - 200 calories"
        );
    }

    #[test]
    fn empty_candidates_is_an_error() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(
            GeminiClient::extract_text(parsed),
            Err(AiError::Empty)
        ));
    }

    #[test]
    fn api_error_body_is_surfaced() {
        let raw = r#"{"error": {"message": "API key not valid"}}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let err = GeminiClient::extract_text(parsed).unwrap_err();
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn url_embeds_model_and_key() {
        let client = GeminiClient::new("k123", "gemini-1.5-flash")
            .with_base_url("http://localhost:9999/v1beta");
        assert_eq!(
            client.url(),
            "http://localhost:9999/v1beta/models/gemini-1.5-flash:generateContent?key=k123"
        );
    }
}
