//! Engine error types

use puzzle_core::TrainerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to spawn engine: {0}")]
    Spawn(String),

    #[error("Engine I/O error: {0}")]
    Io(String),

    #[error("UCI protocol error: {0}")]
    Protocol(String),

    #[error("Engine timed out after {0} ms")]
    Timeout(u64),
}

impl From<EngineError> for TrainerError {
    fn from(e: EngineError) -> Self {
        TrainerError::SearchUnavailable(e.to_string())
    }
}
