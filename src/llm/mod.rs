//! Generation-model client module
//!
//! Provides the client trait, the Gemini implementation, and provider
//! dispatch from configuration.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod gemini;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use types::{FinishReason, GenerationRequest, GenerationResponse, StreamChunk, TokenUsage};

use crate::config::LlmConfig;

/// Create a generation client based on the provider specified in config
///
/// Currently only the "gemini" provider is supported.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "gemini" => {
            debug!("create_client: creating Gemini client");
            Ok(Arc::new(GeminiClient::from_config(config)?))
        }
        other => {
            debug!(provider = %other, "create_client: unknown provider");
            Err(LlmError::InvalidResponse(format!(
                "Unknown LLM provider: '{}'. Supported: gemini",
                other
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_unknown_provider() {
        let config = LlmConfig {
            provider: "delphi".to_string(),
            ..LlmConfig::default()
        };

        let err = match create_client(&config) {
            Ok(_) => panic!("expected an error for unknown provider"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("delphi"));
    }
}
