//! UCI engine process driver implementing the puzzle trainer's search capability

pub mod config;
pub mod engine;
pub mod error;
pub mod stockfish;

#[cfg(all(test, unix))]
mod fake_uci;

pub use config::{Difficulty, EngineConfig};
pub use engine::Engine;
pub use error::EngineError;
