//! API request and response types

use crate::state_machine::Reply;
use serde::{Deserialize, Serialize};

/// One chat turn. Older clients send `usuario_id` and `pregunta`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default, alias = "usuario_id")]
    pub user_id: Option<String>,
    #[serde(default, alias = "pregunta")]
    pub text: String,
}

/// Bot reply to a chat turn
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_topics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl From<Reply> for ChatResponse {
    fn from(reply: Reply) -> Self {
        Self {
            message: reply.message,
            secondary_message: reply.secondary_message,
            pending_topics: reply.pending_topics,
            options: reply.options,
        }
    }
}

/// Service banner
#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub endpoints: Vec<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
