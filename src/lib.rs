//! planforge - curriculum learning-plan and session-plan generator
//!
//! planforge collects curriculum metadata (unit title, level, trainer,
//! schedule shape, curriculum text), sends a single prompt to a hosted
//! generative-language model, accumulates the streamed response, splits it
//! on a literal separator into a Learning Plan and Session Plans, renders
//! both in tabbed terminal views, and exports each as a Word-compatible
//! HTML document.
//!
//! # Core Concepts
//!
//! - **One request at a time**: a single in-flight flag is the only
//!   concurrency-control state, cleared on every settle path
//! - **Accumulate then parse**: the streamed response is concatenated in
//!   arrival order and only split once fully consumed
//! - **Soft output contract**: the separator is enforced by prompt
//!   instruction only; the splitter is the sole safety net
//!
//! # Modules
//!
//! - [`llm`] - generation client trait and Gemini implementation
//! - [`plan`] - request fields, response splitting, session state
//! - [`export`] - Word-compatible export document builder
//! - [`prompts`] - prompt templates and rendering
//! - [`generate`] - one-shot generation driver
//! - [`tui`] - terminal UI
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod export;
pub mod generate;
pub mod llm;
pub mod plan;
pub mod prompts;
pub mod tui;

// Re-export commonly used types
pub use config::{Config, ExportConfig, LlmConfig};
pub use export::{PlanDocument, build_document, document_file_name, write_document};
pub use generate::run_generation;
pub use llm::{
    FinishReason, GeminiClient, GenerationRequest, GenerationResponse, LlmClient, LlmError, StreamChunk, TokenUsage,
    create_client,
};
pub use plan::{ParsedPlans, PlanRequest, PlanSession, SESSION_PLANS_MARKER, SplitWarning, split_response};
pub use prompts::PromptLoader;
