//! LlmClient trait definition

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{GenerationRequest, GenerationResponse, LlmError, StreamChunk};

/// Stateless generation client - each call is independent
///
/// This is the core abstraction for the external-call boundary. Each
/// submission sends exactly one request; no conversation state is kept
/// between calls.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single generation request (blocking until complete)
    async fn complete(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError>;

    /// Streaming generation for progress display
    ///
    /// Sends chunks to the provided channel as they arrive, in arrival
    /// order, and returns the final accumulated response once the stream
    /// has been fully consumed.
    async fn stream(
        &self,
        request: GenerationRequest,
        chunk_tx: mpsc::Sender<StreamChunk>,
    ) -> Result<GenerationResponse, LlmError>;
}
