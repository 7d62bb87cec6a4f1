use std::io;
use std::path::PathBuf;

use metaclean_core::{ErrorBody, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection failure, timeout, or client construction failure
    #[error("Request to cleaner failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The cleaner answered with a non-2xx status
    #[error("Cleaner returned {status}: {message}")]
    Status {
        status: u16,
        message: String,
        body: Option<ErrorBody>,
    },

    #[error("Invalid response from cleaner: {0}")]
    Decode(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Rejected locally, before anything was sent
    #[error("filetype not allowed: {0}")]
    UnsupportedType(String),
}

impl ClientError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ClientError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport(e) if e.is_timeout())
    }

    /// Tool diagnostic or other detail text from the error body, if the server sent one
    pub fn details(&self) -> Option<&str> {
        match self {
            ClientError::Status {
                body: Some(body), ..
            } => body.details.as_deref(),
            _ => None,
        }
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        ClientError::Decode(err.to_string())
    }
}
