//! STDIO transport implementation.
//!
//! The gateway speaks MCP on stdin/stdout, so MCP clients see every backend's
//! tools as if they came from a single server.

use rmcp::ServiceExt;
use tracing::info;

use super::{TransportError, TransportResult};
use crate::core::Gateway;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Run the STDIO transport.
    pub async fn run(gateway: Gateway) -> TransportResult<()> {
        info!("Ready - communicating via stdin/stdout");

        let service = gateway
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(e.to_string()))?;

        service
            .waiting()
            .await
            .map_err(|e| TransportError::service(e.to_string()))?;

        info!("STDIO transport finished");
        Ok(())
    }
}
