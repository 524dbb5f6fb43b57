use serde::{Deserialize, Serialize};

use crate::session::ChatMessage;

#[derive(Debug, Deserialize)]
pub struct ChatSendRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatSendResponse {
    pub reply: String,
    /// Full transcript for display. Only the newest question was sent to the
    /// model.
    pub transcript: Vec<ChatMessage>,
}
