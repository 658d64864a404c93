//! Request/response types for the generation API
//!
//! These types model the Gemini generateContent API but stay provider-agnostic
//! enough to support other hosted text-generation endpoints.

use tracing::debug;

/// A generation request - everything needed for one model call
///
/// The whole application sends exactly one of these per submission: a fixed
/// instruction preamble plus the serialized form fields.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// System instruction (fixed preamble, loaded from the prompt templates)
    pub system_instruction: String,

    /// User prompt (rendered from the Handlebars template)
    pub prompt: String,

    /// Max tokens for the response (from config)
    pub max_tokens: u32,
}

/// Final response from a generation request
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    /// Full accumulated text, chunks concatenated in arrival order
    pub text: String,

    /// Why the model stopped
    pub finish_reason: FinishReason,

    /// Token usage reported by the API
    pub usage: TokenUsage,
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Recitation,
}

impl FinishReason {
    /// Parse from the API's finishReason string
    pub fn from_api(s: &str) -> Self {
        debug!(%s, "FinishReason::from_api: called");
        match s {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::MaxTokens,
            "SAFETY" => FinishReason::Safety,
            "RECITATION" => FinishReason::Recitation,
            _ => {
                debug!("FinishReason::from_api: unknown, defaulting to Stop");
                FinishReason::Stop
            }
        }
    }
}

/// Token usage reported by the API
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Streaming chunk for real-time progress display
///
/// Chunks are delivered over an mpsc channel in arrival order; the UI only
/// uses them for a loading indicator, never for partial-result rendering.
#[derive(Debug, Clone)]
pub enum StreamChunk {
    /// First chunk carrying the prompt token count
    MessageStart { input_tokens: u64 },

    /// Text being generated
    TextDelta(String),

    /// Stream fully consumed, final stats attached
    MessageDone {
        finish_reason: FinishReason,
        usage: TokenUsage,
    },

    /// Error during streaming
    Error(String),
}
