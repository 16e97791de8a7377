//! Transport layer for the gateway.
//!
//! This module provides two ways of reaching the merged tool namespace:
//! - **HTTP**: REST endpoints for listing, invoking and exporting tools - feature: `http`
//! - **STDIO**: the gateway acts as an MCP server itself - feature: `stdio`
//!
//! Each transport handles the connection lifecycle and delegates to the
//! shared [`Gateway`](crate::core::Gateway).

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::HttpConfig;
