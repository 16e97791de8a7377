//! Domains module containing business logic organized by bounded contexts.
//!
//! - **backends**: connections to the MCP servers that actually own the tools
//! - **tools**: the merged registry, argument resolution, routing and export

pub mod backends;
pub mod tools;
