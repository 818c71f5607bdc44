use std::fmt;

use remotestorage_events::EventError;
use remotestorage_future::FutureError;

/// An opaque failure reported by the transport.
///
/// Carries the HTTP status when the server answered with an unexpected one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub message: String,
    pub status: Option<u16>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        Self {
            message: error.to_string(),
            status: error.status().map(|status| status.as_u16()),
        }
    }
}

impl From<url::ParseError> for TransportError {
    fn from(error: url::ParseError) -> Self {
        Self::new(format!("URL parse error: {}", error))
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("argument \"path\" should be a non-empty path string, got {path:?}")]
    InvalidPath { path: String },

    #[error("storage address is not configured")]
    NotConfigured,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("store error: {message}")]
    Store { message: String },

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Future(#[from] FutureError),
}

impl From<remotestorage_kv_store::Error> for Error {
    fn from(error: remotestorage_kv_store::Error) -> Self {
        Error::Store {
            message: error.to_string(),
        }
    }
}
