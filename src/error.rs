//! Error handling and custom error types
//!
//! Every failure the client can surface maps onto one of five kinds so
//! callers can print a kind plus a message and decide whether to retry.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Transport error ({kind}): {message}")]
    Transport {
        kind: TransportErrorKind,
        message: String,
    },

    #[error("Empty response: {0}")]
    EmptyResponse(String),
}

/// Coarse classification of a failed network exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Network,
    /// The server answered with a non-success status.
    Api,
    /// The server answered but the body could not be understood.
    Decode,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Network => "network",
            TransportErrorKind::Api => "api",
            TransportErrorKind::Decode => "decode",
        };
        f.write_str(name)
    }
}

impl Error {
    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Error::Transport {
            kind,
            message: message.into(),
        }
    }

    /// Short stable name for user-facing output.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "ConfigurationError",
            Error::InvalidRequest(_) => "InvalidRequest",
            Error::Upload(_) => "UploadError",
            Error::Transport { .. } => "TransportError",
            Error::EmptyResponse(_) => "EmptyResponse",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_decode() {
            TransportErrorKind::Decode
        } else {
            TransportErrorKind::Network
        };
        Error::transport(kind, e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
