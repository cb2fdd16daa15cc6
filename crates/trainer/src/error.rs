//! Shell error types

use thiserror::Error;

/// Failure fetching a puzzle from the provider
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request error: {0}")]
    Request(String),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Invalid puzzle payload: {0}")]
    Decode(String),
}
