//! Builds a registry from the tools advertised by every connected backend.

use futures::future::join_all;
use tracing::{info, warn};

use super::registry::{CollisionPolicy, ToolRegistry};
use crate::domains::backends::BackendBinding;

/// List tools from all backends concurrently, then merge them in binding order.
///
/// Merging happens sequentially after every listing has returned, so the
/// outcome of a name collision depends only on the order of `bindings`.
/// A backend that is disconnected or fails to list contributes nothing.
pub async fn discover(bindings: &[BackendBinding], policy: CollisionPolicy) -> ToolRegistry {
    let listings = join_all(bindings.iter().map(|binding| async move {
        let tools = match binding.handle() {
            Some(handle) => Some(handle.list_tools().await),
            None => None,
        };
        (binding, tools)
    }))
    .await;

    let mut registry = ToolRegistry::with_policy(policy);
    for (binding, listing) in listings {
        match listing {
            Some(Ok(tools)) => {
                info!("Discovered {} tools from '{}'", tools.len(), binding.name());
                for tool in tools {
                    registry.register(binding, tool);
                }
            }
            Some(Err(e)) => warn!("Skipping backend '{}': {}", binding.name(), e),
            None => warn!("Skipping backend '{}': not connected", binding.name()),
        }
    }

    info!("Registry holds {} tools", registry.len());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::backends::testing::FakeBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_discover_merges_in_binding_order() {
        let bindings = vec![
            BackendBinding::connected("alpha", Arc::new(FakeBackend::with_tools(&["x", "a"]))),
            BackendBinding::connected("beta", Arc::new(FakeBackend::with_tools(&["x", "b"]))),
        ];

        let registry = discover(&bindings, CollisionPolicy::Replace).await;

        assert_eq!(registry.tool_names(), vec!["x", "a", "b"]);
        assert_eq!(registry.lookup("x").unwrap().backend.name(), "beta");
    }

    #[tokio::test]
    async fn test_discover_survives_failing_backends() {
        let bindings = vec![
            BackendBinding::connected("broken", Arc::new(FakeBackend::with_tools(&["lost"]).unlistable())),
            BackendBinding::disconnected("offline"),
            BackendBinding::connected("healthy", Arc::new(FakeBackend::with_tools(&["kept"]))),
        ];

        let registry = discover(&bindings, CollisionPolicy::default()).await;

        assert_eq!(registry.tool_names(), vec!["kept"]);
    }

    #[tokio::test]
    async fn test_discover_without_backends() {
        let registry = discover(&[], CollisionPolicy::default()).await;
        assert!(registry.is_empty());
    }
}
