//! Error types for the client.

use mission_core::CoreError;
use thiserror::Error;

/// Errors that can occur when talking to the server.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport or decoding failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server rejected the request.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The background poller has already shut down.
    #[error("poller stopped")]
    Stopped,

    /// The request was invalid before it was sent.
    #[error(transparent)]
    Core(#[from] CoreError),
}
