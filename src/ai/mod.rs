use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod gemini;

pub use gemini::GeminiClient;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("inference request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("inference API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("failed to decode inference response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("inference response contained no content")]
    Empty,
}

/// An image sent inline with a prompt.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Bytes,
}

/// Single request/response text generation. No streaming, no retries; a
/// failure is returned to the caller, never swallowed.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn generate(&self, prompt: &str, image: Option<InlineImage>) -> Result<String, AiError>;
}
