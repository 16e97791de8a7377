//! The capability every backend connection exposes to the gateway.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::Value;

use super::error::BackendError;
use crate::domains::tools::ToolDescriptor;

/// A connected source of tools.
///
/// Implementations own their transport; the gateway only lists tools and
/// forwards invocations verbatim.
#[async_trait]
pub trait ToolBackend: Send + Sync {
    /// List every tool the backend currently advertises, in its own order.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, BackendError>;

    /// Invoke `tool` with `arguments` and return the backend's raw result content.
    async fn invoke(&self, tool: &str, arguments: JsonObject) -> Result<Value, BackendError>;
}

/// A named backend and, when connected, the handle used to reach it.
#[derive(Clone)]
pub struct BackendBinding {
    name: Arc<str>,
    handle: Option<Arc<dyn ToolBackend>>,
}

impl BackendBinding {
    pub fn connected(name: impl Into<Arc<str>>, handle: Arc<dyn ToolBackend>) -> Self {
        Self {
            name: name.into(),
            handle: Some(handle),
        }
    }

    /// A backend that is configured but has no live session.
    pub fn disconnected(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> Option<&Arc<dyn ToolBackend>> {
        self.handle.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }
}

impl fmt::Debug for BackendBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendBinding")
            .field("name", &self.name)
            .field("connected", &self.is_connected())
            .finish()
    }
}
