//! In-memory backend used by the test suites.

use std::sync::Mutex;

use async_trait::async_trait;
use rmcp::model::JsonObject;
use serde_json::{Value, json};

use super::capability::ToolBackend;
use super::error::BackendError;
use crate::domains::tools::ToolDescriptor;

/// A backend with a fixed tool list that records every call it receives.
pub struct FakeBackend {
    tools: Vec<ToolDescriptor>,
    fail_listing: bool,
    fail_with: Option<String>,
    calls: Mutex<Vec<(String, JsonObject)>>,
}

impl FakeBackend {
    /// A backend exposing tools with the given names and no inputs.
    pub fn with_tools(names: &[&str]) -> Self {
        Self::new(names.iter().map(|name| tool(name, &[])).collect())
    }

    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self {
            tools,
            fail_listing: false,
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make `list_tools` fail.
    pub fn unlistable(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Make every invocation fail with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, JsonObject)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolBackend for FakeBackend {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, BackendError> {
        if self.fail_listing {
            return Err(BackendError::discovery("connection closed"));
        }
        Ok(self.tools.clone())
    }

    async fn invoke(&self, tool: &str, arguments: JsonObject) -> Result<Value, BackendError> {
        self.calls
            .lock()
            .unwrap()
            .push((tool.to_string(), arguments.clone()));

        if let Some(message) = &self.fail_with {
            return Err(BackendError::invocation(message.clone()));
        }

        Ok(json!([{ "type": "text", "text": format!("{} ok", tool) }]))
    }
}

/// A descriptor whose schema declares `inputs` as `(name, type)` pairs.
pub fn tool(name: &str, inputs: &[(&str, &str)]) -> ToolDescriptor {
    let mut properties = serde_json::Map::new();
    for (input, type_tag) in inputs {
        properties.insert(input.to_string(), json!({ "type": type_tag }));
    }

    let schema = json!({ "type": "object", "properties": properties });
    ToolDescriptor::new(
        name,
        Some(format!("The {} tool", name)),
        schema.as_object().cloned().unwrap_or_default(),
    )
}
