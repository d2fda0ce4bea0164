//! API request and response types.

use serde::{Deserialize, Serialize};

/// Session used when a request names none.
pub const DEFAULT_SESSION: &str = "default";

/// Body of `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's message
    pub message: String,

    /// Conversation to continue; omitted or blank means the default session
    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatRequest {
    pub fn session_id(&self) -> &str {
        self.session_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION)
    }
}

/// Successful reply of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub persona: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
