//! Backends domain module.
//!
//! A backend is an external process that advertises tools. The gateway only
//! sees it through the [`ToolBackend`] capability, so transports other than
//! MCP child processes can be plugged in behind the same trait.
//!
//! ## Architecture
//!
//! - `capability.rs` - The `ToolBackend` trait and `BackendBinding`
//! - `mcp.rs` - rmcp client sessions spawned from the backend settings
//! - `error.rs` - Backend-specific error types

mod capability;
mod error;
pub mod mcp;

#[cfg(test)]
pub(crate) mod testing;

pub use capability::{BackendBinding, ToolBackend};
pub use error::BackendError;
pub use mcp::{McpBackend, connect_all};
