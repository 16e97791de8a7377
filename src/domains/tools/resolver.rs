//! Parameter Resolver - turns a raw invocation request into a tool name and
//! one flat argument object.
//!
//! A request always carries a selector of the form
//! `<tool>[ key1=value1 key2=value2 ...]`. Depending on how it arrived, extra
//! arguments come either from the query string or from a JSON payload, and the
//! two channels merge with opposite precedence:
//!
//! - query channel: selector params, overridden by query params
//! - payload channel: payload, overridden by selector params

use rmcp::model::JsonObject;
use serde_json::Value;

use super::error::ToolError;

/// A parsed selector.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSelector {
    pub tool_name: String,
    /// `key=value` pairs written after the tool name.
    pub inline: JsonObject,
}

/// The output of resolution: what to call and with what.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInvocation {
    pub tool_name: String,
    pub arguments: JsonObject,
}

/// Parse a selector.
///
/// Tokens are separated by single spaces. Tokens without `=`, or whose key is
/// empty, are ignored. Values keep everything after the first `=`.
pub fn parse_selector(selector: &str) -> Result<ToolSelector, ToolError> {
    let mut tokens = selector.split(' ');

    let tool_name = match tokens.next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ToolError::MissingToolName),
    };

    let mut inline = JsonObject::new();
    for token in tokens {
        match token.split_once('=') {
            Some((key, value)) if !key.is_empty() => {
                inline.insert(key.to_string(), Value::String(value.to_string()));
            }
            _ => {}
        }
    }

    Ok(ToolSelector { tool_name, inline })
}

/// Resolve a request whose extra arguments come from the query string.
///
/// Query params win over selector params on key collision.
pub fn resolve_query<I>(selector: Option<&str>, params: I) -> Result<ResolvedInvocation, ToolError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let ToolSelector {
        tool_name,
        mut inline,
    } = parse_selector(selector.unwrap_or_default())?;

    for (key, value) in params {
        inline.insert(key, Value::String(value));
    }

    Ok(ResolvedInvocation {
        tool_name,
        arguments: inline,
    })
}

/// Resolve a request whose extra arguments come from a JSON payload.
///
/// Selector params win over payload fields on key collision.
pub fn resolve_payload(
    selector: Option<&str>,
    mut payload: JsonObject,
) -> Result<ResolvedInvocation, ToolError> {
    let ToolSelector { tool_name, inline } = parse_selector(selector.unwrap_or_default())?;

    payload.extend(inline);

    Ok(ResolvedInvocation {
        tool_name,
        arguments: payload,
    })
}
