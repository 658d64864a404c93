//! LLM error types

use thiserror::Error;

/// Errors that can occur when talking to the generation API
///
/// There is no retry policy anywhere: every failure is surfaced to the
/// caller as-is and is terminal to the current submission only.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Message suitable for direct display to the user
    ///
    /// Falls back to a generic message when the API returned an empty body.
    pub fn user_message(&self) -> String {
        match self {
            LlmError::ApiError { status, message } if message.trim().is_empty() => {
                format!(
                    "API error {}: An unexpected error occurred. Please check your connection or API key.",
                    status
                )
            }
            other => other.to_string(),
        }
    }
}
