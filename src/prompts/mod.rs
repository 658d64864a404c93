//! Prompt templates and rendering
//!
//! The system instruction is a fixed preamble; the user prompt interpolates
//! the plan request fields through Handlebars.

mod embedded;
mod loader;

pub use loader::PromptLoader;
