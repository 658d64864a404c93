//! One-shot generation driver
//!
//! Composes the prompt payload, streams the model response while reporting
//! progress, then applies the fully accumulated text to the session. One
//! outstanding request at a time; the session's in-flight flag is the only
//! concurrency-control state, and it is cleared on every settle path.

use std::sync::Arc;

use eyre::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::llm::{GenerationRequest, LlmClient, StreamChunk};
use crate::plan::{PlanRequest, PlanSession};
use crate::prompts::PromptLoader;

/// Run one full generation attempt against the session
///
/// `on_progress` is invoked for every stream chunk in arrival order; chunks
/// are for progress display only - no partial-result parsing happens before
/// the stream is fully consumed. A transport or model error is recorded in
/// the session (results cleared, in-flight cleared) and also returned.
pub async fn run_generation(
    llm: &Arc<dyn LlmClient>,
    prompts: &PromptLoader,
    request: &PlanRequest,
    max_tokens: u32,
    session: &mut PlanSession,
    mut on_progress: impl FnMut(&StreamChunk),
) -> Result<()> {
    request.validate()?;

    let system_instruction = prompts.system_prompt()?;
    let prompt = prompts.user_prompt(request)?;

    session.begin();
    info!("Starting generation for unit '{}'", request.unit_title);

    let generation = GenerationRequest {
        system_instruction,
        prompt,
        max_tokens,
    };

    let (chunk_tx, mut chunk_rx) = mpsc::channel::<StreamChunk>(100);

    let llm = Arc::clone(llm);
    let task = tokio::spawn(async move { llm.stream(generation, chunk_tx).await });

    // Drain until the sender side closes; concatenation order is the
    // client's arrival order
    while let Some(chunk) = chunk_rx.recv().await {
        on_progress(&chunk);
    }

    match task.await {
        Ok(Ok(response)) => {
            debug!(text_len = response.text.len(), "run_generation: stream complete");
            session.apply_response(&response.text);
            Ok(())
        }
        Ok(Err(e)) => {
            let message = e.user_message();
            session.apply_error(&message);
            Err(eyre::eyre!(message))
        }
        Err(e) => {
            session.apply_error(e.to_string());
            Err(eyre::eyre!("Generation task failed: {}", e))
        }
    }
}
