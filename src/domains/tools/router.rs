//! Invocation Router - dispatches a resolved call to the backend owning the tool.

use std::sync::Arc;
use std::time::Instant;

use rmcp::model::JsonObject;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::error::ToolError;
use super::registry::RegistryHandle;

/// Outcome of a call the backend completed successfully.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationSuccess {
    /// The backend's raw result content.
    pub result: Value,
    pub tool: String,
    pub backend: String,
    #[serde(rename = "executionTime")]
    pub elapsed_ms: u64,
}

/// Routes invocations through the current registry snapshot.
///
/// Holds no lock across calls: each invocation takes its own snapshot and
/// then only awaits the backend.
#[derive(Debug, Clone)]
pub struct InvocationRouter {
    registry: Arc<RegistryHandle>,
}

impl InvocationRouter {
    pub fn new(registry: Arc<RegistryHandle>) -> Self {
        Self { registry }
    }

    /// Invoke `tool_name` once with `arguments`, passed to the backend verbatim.
    #[instrument(skip(self, arguments))]
    pub async fn invoke(
        &self,
        tool_name: &str,
        arguments: JsonObject,
    ) -> Result<InvocationSuccess, ToolError> {
        let registry = self.registry.snapshot().await;

        let entry = registry.lookup(tool_name).ok_or_else(|| {
            warn!("Unknown tool requested: {}", tool_name);
            ToolError::not_found(tool_name)
        })?;

        let backend = entry
            .backend
            .handle()
            .ok_or_else(|| ToolError::backend_unavailable(tool_name, entry.backend.name()))?;

        let started = Instant::now();
        let outcome = backend.invoke(entry.descriptor.name(), arguments).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => {
                info!(
                    "Tool '{}' on '{}' completed in {}ms",
                    tool_name,
                    entry.backend.name(),
                    elapsed_ms
                );
                Ok(InvocationSuccess {
                    result,
                    tool: tool_name.to_string(),
                    backend: entry.backend.name().to_string(),
                    elapsed_ms,
                })
            }
            Err(e) => {
                warn!(
                    "Tool '{}' on '{}' failed after {}ms: {}",
                    tool_name,
                    entry.backend.name(),
                    elapsed_ms,
                    e
                );
                Err(ToolError::execution_failed(e.to_string(), elapsed_ms))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::backends::BackendBinding;
    use crate::domains::backends::testing::{FakeBackend, tool};
    use crate::domains::tools::registry::{CollisionPolicy, ToolRegistry};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn router_with(binding: BackendBinding, tools: &[&str]) -> InvocationRouter {
        let mut registry = ToolRegistry::with_policy(CollisionPolicy::Replace);
        for name in tools {
            registry.register(&binding, tool(name, &[]));
        }
        InvocationRouter::new(Arc::new(RegistryHandle::new(registry)))
    }

    fn args(value: Value) -> JsonObject {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_invoke_success() {
        let backend = Arc::new(FakeBackend::with_tools(&["echo"]));
        let router = router_with(BackendBinding::connected("util", backend.clone()), &["echo"]);

        let success = assert_ok!(router.invoke("echo", args(json!({ "text": "hi" }))).await);

        assert_eq!(success.tool, "echo");
        assert_eq!(success.backend, "util");
        assert_eq!(success.result, json!([{ "type": "text", "text": "echo ok" }]));

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "echo");
        assert_eq!(Value::Object(calls[0].1.clone()), json!({ "text": "hi" }));
    }

    #[tokio::test]
    async fn test_unknown_tool_never_reaches_backend() {
        let backend = Arc::new(FakeBackend::with_tools(&["echo"]));
        let router = router_with(BackendBinding::connected("util", backend.clone()), &["echo"]);

        let err = assert_err!(router.invoke("missing", JsonObject::new()).await);

        assert!(matches!(err, ToolError::NotFound(ref name) if name == "missing"));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_disconnected_backend() {
        let router = router_with(BackendBinding::disconnected("gone"), &["echo"]);

        let err = assert_err!(router.invoke("echo", JsonObject::new()).await);

        assert!(matches!(err, ToolError::BackendUnavailable { .. }));
        assert!(err.to_string().contains("gone"));
    }

    #[tokio::test]
    async fn test_backend_failure_carries_message_and_time() {
        let backend = Arc::new(FakeBackend::with_tools(&["boom"]).failing("disk full"));
        let router = router_with(BackendBinding::connected("util", backend), &["boom"]);

        let err = assert_err!(router.invoke("boom", JsonObject::new()).await);

        assert!(err.to_string().contains("disk full"));
        assert!(err.elapsed_ms().is_some());
    }

    #[tokio::test]
    async fn test_prefixed_tool_uses_backend_name() {
        let alpha = Arc::new(FakeBackend::with_tools(&["x"]));
        let beta = Arc::new(FakeBackend::with_tools(&["x"]));

        let mut registry = ToolRegistry::with_policy(CollisionPolicy::Prefix);
        registry.register(&BackendBinding::connected("alpha", alpha.clone()), tool("x", &[]));
        registry.register(&BackendBinding::connected("beta", beta.clone()), tool("x", &[]));
        let router = InvocationRouter::new(Arc::new(RegistryHandle::new(registry)));

        let success = assert_ok!(router.invoke("beta__x", JsonObject::new()).await);

        assert_eq!(success.tool, "beta__x");
        assert_eq!(beta.calls()[0].0, "x");
        assert!(alpha.calls().is_empty());
    }
}
