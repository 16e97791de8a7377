//! Backend-specific error types.

use thiserror::Error;

/// Errors reported by a backend connection.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend process could not be spawned or the session handshake failed.
    #[error("Failed to connect to backend '{backend}': {message}")]
    Connect { backend: String, message: String },

    /// Listing the backend's tools failed.
    #[error("Failed to list tools: {0}")]
    Discovery(String),

    /// The backend executed the call and reported an error.
    #[error("{0}")]
    Invocation(String),
}

impl BackendError {
    /// Create a new connection error.
    pub fn connect(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connect {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create a new discovery error.
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// Create a new invocation error.
    pub fn invocation(msg: impl Into<String>) -> Self {
        Self::Invocation(msg.into())
    }
}
