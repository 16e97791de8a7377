//! MCP Gateway Library
//!
//! This crate exposes the tools of several MCP servers through one merged
//! namespace, reachable over a REST surface or as an MCP server itself.
//!
//! # Architecture
//!
//! The gateway is organized into the following modules:
//!
//! - **core**: Configuration, error handling, the `Gateway` service and transports
//! - **domains**: Business logic organized by bounded contexts
//!   - **backends**: Connections to the MCP servers that own the tools
//!   - **tools**: Registry, argument resolution, invocation routing and export
//!
//! # Example
//!
//! ```rust,no_run
//! use mcp_gateway::core::{Config, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let gateway = Gateway::connect(config).await;
//!     let tools = gateway.list_tools().await;
//!     println!("{} tools available", tools.len());
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, Gateway, Result};
