use miku_llm::LlmError;
use thiserror::Error;

/// Errors that end a turn without a reply.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("generation failed: {0}")]
    Generation(#[from] LlmError),
    #[error("turn task did not complete: {0}")]
    Interrupted(String),
}
