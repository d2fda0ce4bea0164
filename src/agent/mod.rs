//! Conversation loop.
//!
//! Each user message runs a bounded "tools in a loop" exchange:
//! 1. Detect the persona and select its tools
//! 2. Call the model with the full history and those tools
//! 3. If the model requests tool calls, execute them in order and feed the
//!    results back
//! 4. Repeat until the model answers with text or the round limit is hit

mod agent_loop;
mod prompt;

use thiserror::Error;

pub use agent_loop::{ChatReply, ChatSession};
pub use prompt::build_system_instruction;

/// Failure of a whole `chat` call. Tool failures are not in here; they are
/// handed back to the model as results.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Model call failed: {0:#}")]
    Model(anyhow::Error),

    #[error("No final answer after {rounds} model rounds")]
    Exhausted { rounds: usize },

    #[error(transparent)]
    Catalog(#[from] crate::tools::CatalogError),
}
