//! Trainer error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
