//! MCP backends reached through rmcp client sessions over child processes.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use rmcp::{
    RoleClient, ServiceExt,
    model::{CallToolRequestParam, JsonObject},
    service::RunningService,
    transport::{ConfigureCommandExt, TokioChildProcess},
};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::capability::{BackendBinding, ToolBackend};
use super::error::BackendError;
use crate::core::config::BackendSettings;
use crate::domains::tools::ToolDescriptor;

type McpClient = RunningService<RoleClient, ()>;

/// A live MCP session with one backend process.
pub struct McpBackend {
    client: McpClient,
}

impl McpBackend {
    /// Spawn the backend's command and complete the MCP handshake.
    #[instrument(skip_all, fields(backend = %settings.name))]
    pub async fn spawn(settings: &BackendSettings) -> Result<Self, BackendError> {
        let command = tokio::process::Command::new(&settings.command).configure(|cmd| {
            cmd.args(&settings.args)
                .envs(settings.env.iter())
                .stderr(std::process::Stdio::inherit());
        });

        let transport = TokioChildProcess::new(command).map_err(|e| {
            BackendError::connect(&settings.name, format!("spawn '{}': {}", settings.command, e))
        })?;

        let client = ()
            .serve(transport)
            .await
            .map_err(|e| BackendError::connect(&settings.name, format!("initialize session: {}", e)))?;

        info!("Connected to backend '{}'", settings.name);

        Ok(Self { client })
    }
}

#[async_trait]
impl ToolBackend for McpBackend {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, BackendError> {
        let tools = self
            .client
            .peer()
            .list_all_tools()
            .await
            .map_err(|e| BackendError::discovery(e.to_string()))?;

        Ok(tools.iter().map(ToolDescriptor::from_rmcp).collect())
    }

    async fn invoke(&self, tool: &str, arguments: JsonObject) -> Result<Value, BackendError> {
        // Built through serde so protocol fields we never set keep their defaults.
        let request: CallToolRequestParam = serde_json::from_value(serde_json::json!({
            "name": tool,
            "arguments": arguments,
        }))
        .map_err(|e| BackendError::invocation(format!("invalid call request: {}", e)))?;

        let result = self
            .client
            .peer()
            .call_tool(request)
            .await
            .map_err(|e| BackendError::invocation(e.to_string()))?;

        serde_json::to_value(&result.content)
            .map_err(|e| BackendError::invocation(format!("unreadable tool result: {}", e)))
    }
}

/// Connect to every configured backend concurrently.
///
/// Bindings come back in configuration order. A backend that fails to start
/// yields a disconnected binding instead of an error.
pub async fn connect_all(settings: &[BackendSettings]) -> Vec<BackendBinding> {
    let attempts = settings.iter().map(|backend| async move {
        match McpBackend::spawn(backend).await {
            Ok(session) => {
                let handle: Arc<dyn ToolBackend> = Arc::new(session);
                BackendBinding::connected(backend.name.as_str(), handle)
            }
            Err(e) => {
                warn!("{}", e);
                BackendBinding::disconnected(backend.name.as_str())
            }
        }
    });

    join_all(attempts).await
}
