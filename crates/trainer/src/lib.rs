//! Terminal puzzle trainer: fetches puzzles, runs the solving loop, and hosts
//! supervised play against a UCI engine.

pub mod board;
pub mod clients;
pub mod config;
pub mod console;
pub mod error;
pub mod modes;
