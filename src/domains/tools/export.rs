//! Tool Exporter - describes every registered tool as an HTTP integration
//! record that third-party automation platforms can import.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::registry::{RegistryEntry, ToolRegistry};

/// Placeholder callers substitute with their API key.
pub const API_KEY_PLACEHOLDER: &str = "{{API_KEY}}";

/// Header carrying the gateway credential.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HttpMethod {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderTemplate {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportInput {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportOutput {
    pub name: String,
    pub key: String,
    pub id: String,
}

/// Integration record for one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRecord {
    pub name: String,
    pub description: String,
    pub url: String,
    pub headers: Vec<HeaderTemplate>,
    pub inputs: Vec<ExportInput>,
    pub outputs: Vec<ExportOutput>,
    /// JSON request body template; empty when the tool takes no inputs.
    pub body: String,
    pub content_type: String,
    pub method: HttpMethod,
}

/// Projects a registry into export records.
#[derive(Debug, Clone)]
pub struct ToolExporter {
    base_url: String,
}

impl ToolExporter {
    /// `base_url` is the externally reachable root of the gateway.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Export every tool, keyed by its exposed name.
    pub fn export_all(&self, registry: &ToolRegistry) -> BTreeMap<String, ExportRecord> {
        let records: BTreeMap<_, _> = registry
            .list_all()
            .iter()
            .map(|entry| (entry.tool_name.clone(), self.export(entry)))
            .collect();
        debug!("Exported {} tools", records.len());
        records
    }

    /// Build the record for a single entry.
    pub fn export(&self, entry: &RegistryEntry) -> ExportRecord {
        let inputs: Vec<ExportInput> = entry
            .descriptor
            .params()
            .iter()
            .map(|param| ExportInput {
                name: param.name.clone(),
                type_tag: param.type_tag.clone().unwrap_or_else(|| "string".to_string()),
            })
            .collect();

        let (method, body) = if inputs.is_empty() {
            (HttpMethod::Get, String::new())
        } else {
            (HttpMethod::Post, body_template(&inputs))
        };

        ExportRecord {
            name: entry.tool_name.clone(),
            description: entry.descriptor.description().unwrap_or_default().to_string(),
            url: self.callback_url(&entry.tool_name),
            headers: vec![HeaderTemplate {
                key: API_KEY_HEADER.to_string(),
                value: API_KEY_PLACEHOLDER.to_string(),
            }],
            inputs,
            outputs: vec![ExportOutput {
                name: "Result".to_string(),
                key: "result".to_string(),
                id: result_id(&entry.tool_name),
            }],
            body,
            content_type: "application/json".to_string(),
            method,
        }
    }

    fn callback_url(&self, tool_name: &str) -> String {
        format!("{}/invoke?{}", self.base_url, query_pair("tool", tool_name))
    }
}

fn query_pair(key: &str, value: &str) -> String {
    // Serializing a single pair of strings cannot fail.
    serde_urlencoded::to_string([(key, value)]).unwrap_or_default()
}

/// `{"<input>": "{{<input>}}", ...}` in input order.
fn body_template(inputs: &[ExportInput]) -> String {
    let template: serde_json::Map<String, serde_json::Value> = inputs
        .iter()
        .map(|input| {
            (
                input.name.clone(),
                serde_json::Value::String(format!("{{{{{}}}}}", input.name)),
            )
        })
        .collect();
    serde_json::Value::Object(template).to_string()
}

/// Identifier of a tool's single output.
///
/// Stable across runs for the same name; not collision resistant.
pub fn result_id(tool_name: &str) -> String {
    format!("{:08x}", legacy_hash(format!("{}_result", tool_name).as_bytes()))
}

/// `h = h * 31 + byte` over wrapping 32-bit signed arithmetic, then the
/// absolute value. Downstream integrations may store these values, so the
/// mix must not change.
fn legacy_hash(bytes: &[u8]) -> u32 {
    let hash = bytes.iter().fold(0i32, |hash, &byte| {
        hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(i32::from(byte))
    });
    hash.unsigned_abs()
}
