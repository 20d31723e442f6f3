//! HTTP request execution error types.
//!
//! Transport failures reach callers of the raw helpers exactly as the
//! transport reported them: a reqwest failure is carried as the
//! `reqwest::Error` itself, with its full `source()` chain.

use std::error::Error as StdError;
use thiserror::Error;

/// Errors that can occur during HTTP request execution.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The reqwest transport failed (DNS, connect, TLS, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Failure reported by a custom [`Transport`](crate::executor::Transport).
    #[error("Transport error: {0}")]
    Other(#[source] Box<dyn StdError + Send + Sync>),

    /// The session was invalidated while the request was in flight.
    #[error("Request cancelled")]
    Cancelled,

    /// The session itself could not be created, or there was no runtime to
    /// dispatch on.
    #[error("Session error: {0}")]
    Session(String),
}

impl RequestError {
    /// Wraps an error produced by a custom transport.
    pub fn other(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        RequestError::Other(err.into())
    }

    /// Whether this error came from `cancel_requests()`.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RequestError::Cancelled)
    }

    /// Whether the transport gave up waiting.
    pub fn is_timeout(&self) -> bool {
        self.reqwest_error().map_or(false, reqwest::Error::is_timeout)
    }

    /// Whether no connection could be established.
    pub fn is_connect(&self) -> bool {
        self.reqwest_error().map_or(false, reqwest::Error::is_connect)
    }

    /// The underlying reqwest error, if the reqwest transport produced this.
    pub fn reqwest_error(&self) -> Option<&reqwest::Error> {
        match self {
            RequestError::Transport(err) => Some(err),
            _ => None,
        }
    }
}
