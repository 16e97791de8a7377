//! Canonical description of a tool advertised by a backend.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One declared parameter of a tool's input schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Property name in the input schema.
    pub name: String,

    /// JSON schema type tag, if the schema declares one.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,

    /// Whether the property is listed in the schema's `required` array.
    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A tool as discovered from its backend. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    name: String,
    description: Option<String>,
    input_schema: Arc<JsonObject>,
    params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    /// Build a descriptor from a raw JSON input schema.
    ///
    /// Parameters are taken from the schema's `properties` object in
    /// declaration order.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        input_schema: impl Into<Arc<JsonObject>>,
    ) -> Self {
        let input_schema = input_schema.into();
        let params = params_from_schema(&input_schema);
        Self {
            name: name.into(),
            description,
            input_schema,
            params,
        }
    }

    /// Convert a tool listed by an rmcp peer.
    pub fn from_rmcp(tool: &Tool) -> Self {
        Self::new(
            tool.name.to_string(),
            tool.description.as_ref().map(|d| d.to_string()),
            tool.input_schema.clone(),
        )
    }

    /// Convert back into an rmcp tool, optionally under another name.
    pub fn to_rmcp(&self, exposed_name: &str) -> Tool {
        let mut tool = Tool::new(
            Cow::Owned(exposed_name.to_string()),
            Cow::Owned(self.description.clone().unwrap_or_default()),
            self.input_schema.clone(),
        );
        tool.description = self.description.clone().map(Cow::Owned);
        tool
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The raw input schema as advertised by the backend.
    pub fn input_schema(&self) -> &Arc<JsonObject> {
        &self.input_schema
    }

    /// Declared parameters, in schema order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }
}

fn params_from_schema(schema: &JsonObject) -> Vec<ParamSpec> {
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };

    properties
        .iter()
        .map(|(name, property)| ParamSpec {
            name: name.clone(),
            type_tag: type_tag(property),
            required: required.contains(&name.as_str()),
            description: property
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
        .collect()
}

/// Schemas may declare `"type": "x"` or `"type": ["x", "null"]`.
fn type_tag(property: &Value) -> Option<String> {
    match property.get("type")? {
        Value::String(tag) => Some(tag.clone()),
        Value::Array(tags) => tags
            .iter()
            .filter_map(Value::as_str)
            .find(|tag| *tag != "null")
            .map(str::to_string),
        _ => None,
    }
}
