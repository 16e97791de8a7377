//! Tool-specific error types.

use thiserror::Error;

/// Errors that terminate a single tool invocation.
///
/// Callers only ever see the rendered message; there is no separate error
/// code contract.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The selector did not contain a tool name.
    #[error("Tool name is required")]
    MissingToolName,

    /// No registry entry exists for the requested tool.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The tool is registered but its backend has no live session.
    #[error("Backend '{backend}' for tool '{tool}' is not available")]
    BackendUnavailable { tool: String, backend: String },

    /// The backend ran the tool and reported an error.
    #[error("Tool execution failed: {message}")]
    ExecutionFailed { message: String, elapsed_ms: u64 },
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "backend unavailable" error.
    pub fn backend_unavailable(tool: impl Into<String>, backend: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            tool: tool.into(),
            backend: backend.into(),
        }
    }

    /// Create a new "execution failed" error.
    pub fn execution_failed(message: impl Into<String>, elapsed_ms: u64) -> Self {
        Self::ExecutionFailed {
            message: message.into(),
            elapsed_ms,
        }
    }

    /// Time spent in the backend, when the call reached one.
    pub fn elapsed_ms(&self) -> Option<u64> {
        match self {
            Self::ExecutionFailed { elapsed_ms, .. } => Some(*elapsed_ms),
            _ => None,
        }
    }
}
