//! Gateway service and its MCP server handler.
//!
//! [`Gateway`] owns the backend bindings, the shared registry snapshot, the
//! invocation router and the exporter. Transports only talk to this type:
//! the HTTP transport through its inherent methods, the STDIO transport
//! through the `ServerHandler` implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, model::*, service::RequestContext,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::config::Config;
use crate::domains::backends::{BackendBinding, connect_all};
use crate::domains::tools::{
    ExportRecord, InvocationRouter, InvocationSuccess, RegistryHandle, ResolvedInvocation,
    ToolError, ToolExporter, ToolRegistry, discover, resolve_payload, resolve_query,
};

/// One row of the tool listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolListing {
    pub name: String,
    pub backend: String,
    pub description: Option<String>,
    pub input_schema: JsonObject,
}

/// Connected backends and known tools.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub backends: Vec<String>,
    pub tools: Vec<String>,
}

/// The gateway: one namespace over every backend's tools.
#[derive(Clone)]
pub struct Gateway {
    /// Gateway configuration.
    config: Arc<Config>,

    /// Backends in connection order, connected or not.
    bindings: Arc<Vec<BackendBinding>>,

    /// Current registry snapshot.
    registry: Arc<RegistryHandle>,

    router: InvocationRouter,

    exporter: ToolExporter,
}

impl Gateway {
    /// Connect to every configured backend and discover their tools.
    pub async fn connect(config: Config) -> Self {
        if config.backends.servers.is_empty() {
            warn!("No backends configured - no tools will be available");
        }
        let bindings = connect_all(&config.backends.servers).await;
        Self::with_bindings(config, bindings).await
    }

    /// Build a gateway over already established bindings.
    pub async fn with_bindings(config: Config, bindings: Vec<BackendBinding>) -> Self {
        let registry = discover(&bindings, config.backends.collision_policy).await;
        Self::from_registry(config, bindings, registry)
    }

    /// Assemble a gateway around an already discovered registry.
    pub(crate) fn from_registry(
        config: Config,
        bindings: Vec<BackendBinding>,
        registry: ToolRegistry,
    ) -> Self {
        let registry = Arc::new(RegistryHandle::new(registry));

        Self {
            router: InvocationRouter::new(registry.clone()),
            exporter: ToolExporter::new(config.public_url()),
            config: Arc::new(config),
            bindings: Arc::new(bindings),
            registry,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the gateway configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Every registry entry with its owning backend.
    pub async fn list_tools(&self) -> Vec<ToolListing> {
        let registry = self.registry.snapshot().await;
        registry
            .list_all()
            .iter()
            .map(|entry| ToolListing {
                name: entry.tool_name.clone(),
                backend: entry.backend.name().to_string(),
                description: entry.descriptor.description().map(str::to_string),
                input_schema: entry.descriptor.input_schema().as_ref().clone(),
            })
            .collect()
    }

    /// Invoke a tool whose extra arguments came from the query string.
    pub async fn invoke_query(
        &self,
        selector: Option<&str>,
        params: Vec<(String, String)>,
    ) -> Result<InvocationSuccess, ToolError> {
        self.invoke(resolve_query(selector, params)?).await
    }

    /// Invoke a tool whose extra arguments came from a JSON payload.
    pub async fn invoke_payload(
        &self,
        selector: Option<&str>,
        payload: JsonObject,
    ) -> Result<InvocationSuccess, ToolError> {
        self.invoke(resolve_payload(selector, payload)?).await
    }

    /// Route an already resolved invocation.
    pub async fn invoke(
        &self,
        invocation: ResolvedInvocation,
    ) -> Result<InvocationSuccess, ToolError> {
        self.router
            .invoke(&invocation.tool_name, invocation.arguments)
            .await
    }

    /// Export records for every tool, computed from the current snapshot.
    pub async fn export(&self) -> BTreeMap<String, ExportRecord> {
        let registry = self.registry.snapshot().await;
        self.exporter.export_all(&registry)
    }

    pub async fn health(&self) -> HealthReport {
        let registry = self.registry.snapshot().await;
        HealthReport {
            backends: self
                .bindings
                .iter()
                .filter(|b| b.is_connected())
                .map(|b| b.name().to_string())
                .collect(),
            tools: registry.tool_names().into_iter().map(str::to_string).collect(),
        }
    }

    /// Re-list every backend's tools and swap in the resulting registry.
    ///
    /// Returns the number of tools now registered.
    pub async fn refresh(&self) -> usize {
        let policy = self.registry.snapshot().await.policy();
        let registry = discover(&self.bindings, policy).await;
        let count = registry.len();
        self.registry.replace(registry).await;
        info!("Registry refreshed: {} tools", count);
        count
    }
}

/// Turn a backend's raw result content back into MCP content items.
fn into_contents(result: serde_json::Value) -> Vec<Content> {
    match serde_json::from_value::<Vec<Content>>(result.clone()) {
        Ok(contents) => contents,
        Err(_) => vec![Content::text(result.to_string())],
    }
}

impl ServerHandler for Gateway {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Gateway exposing the tools of several MCP servers under one namespace."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    #[instrument(skip(self, _context))]
    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        info!("Listing tools");
        let registry = self.registry.snapshot().await;
        let tools = registry
            .list_all()
            .iter()
            .map(|entry| entry.descriptor.to_rmcp(&entry.tool_name))
            .collect();
        Ok(ListToolsResult {
            tools,
            next_cursor: None,
            meta: None,
        })
    }

    #[instrument(skip(self, _context), fields(tool = %request.name))]
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = request.arguments.unwrap_or_default();
        match self.router.invoke(&request.name, arguments).await {
            Ok(success) => Ok(CallToolResult::success(into_contents(success.result))),
            Err(e @ ToolError::NotFound(_)) => Err(McpError::invalid_params(e.to_string(), None)),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::backends::testing::{FakeBackend, tool};
    use crate::domains::tools::CollisionPolicy;
    use serde_json::json;

    async fn gateway() -> (Gateway, Arc<FakeBackend>) {
        let search = Arc::new(FakeBackend::new(vec![tool("search", &[("q", "string")])]));
        let bindings = vec![
            BackendBinding::connected("web", search.clone()),
            BackendBinding::connected("broken", Arc::new(FakeBackend::with_tools(&["lost"]).unlistable())),
            BackendBinding::disconnected("offline"),
            BackendBinding::connected("util", Arc::new(FakeBackend::with_tools(&["ping"]))),
        ];
        (Gateway::with_bindings(Config::default(), bindings).await, search)
    }

    #[tokio::test]
    async fn test_listing_is_union_of_healthy_backends() {
        let (gateway, _) = gateway().await;

        let tools = gateway.list_tools().await;
        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["search", "ping"]);
        assert_eq!(tools[0].backend, "web");
        assert_eq!(tools[0].input_schema["properties"]["q"]["type"], "string");
    }

    #[tokio::test]
    async fn test_health_reports_connected_backends() {
        let (gateway, _) = gateway().await;

        let health = gateway.health().await;
        assert_eq!(health.backends, vec!["web", "broken", "util"]);
        assert_eq!(health.tools, vec!["search", "ping"]);
    }

    #[tokio::test]
    async fn test_invoke_channels() {
        let (gateway, search) = gateway().await;

        gateway
            .invoke_query(Some("search q=rust"), vec![("q".to_string(), "tokio".to_string())])
            .await
            .unwrap();
        gateway
            .invoke_payload(
                Some("search q=rust"),
                json!({ "q": "tokio", "page": 2 }).as_object().cloned().unwrap(),
            )
            .await
            .unwrap();

        let calls = search.calls();
        assert_eq!(serde_json::Value::Object(calls[0].1.clone()), json!({ "q": "tokio" }));
        assert_eq!(
            serde_json::Value::Object(calls[1].1.clone()),
            json!({ "q": "rust", "page": 2 })
        );
    }

    #[tokio::test]
    async fn test_invoke_without_selector() {
        let (gateway, _) = gateway().await;

        let err = gateway.invoke_query(None, vec![]).await.unwrap_err();
        assert!(matches!(err, ToolError::MissingToolName));
    }

    #[tokio::test]
    async fn test_export_uses_public_url() {
        let mut config = Config::default();
        config.server.public_url = Some("https://gw.example.com".to_string());
        let bindings = vec![BackendBinding::connected(
            "util",
            Arc::new(FakeBackend::with_tools(&["ping"])),
        )];
        let gateway = Gateway::with_bindings(config, bindings).await;

        let export = gateway.export().await;
        assert_eq!(export["ping"].url, "https://gw.example.com/invoke?tool=ping");
    }

    #[tokio::test]
    async fn test_refresh_keeps_policy() {
        let mut config = Config::default();
        config.backends.collision_policy = CollisionPolicy::Prefix;
        let bindings = vec![
            BackendBinding::connected("a", Arc::new(FakeBackend::with_tools(&["x"]))),
            BackendBinding::connected("b", Arc::new(FakeBackend::with_tools(&["x"]))),
        ];
        let gateway = Gateway::with_bindings(config, bindings).await;

        assert_eq!(gateway.refresh().await, 2);
        assert_eq!(gateway.health().await.tools, vec!["x", "b__x"]);
    }

    #[test]
    fn test_into_contents_falls_back_to_text() {
        let contents = into_contents(json!({ "not": "content" }));
        assert_eq!(contents.len(), 1);

        let contents = into_contents(json!([{ "type": "text", "text": "hi" }]));
        let text = match &contents[0].raw {
            RawContent::Text(text) => &text.text,
            _ => panic!("Expected text content"),
        };
        assert_eq!(text, "hi");
    }
}
