//! HTTP transport implementation.
//!
//! REST surface over the gateway:
//!
//! - `GET  /`              - API info
//! - `GET  /health`        - connected backends and known tools
//! - `GET  /tools`         - merged tool listing
//! - `GET  /invoke`        - invoke with `tool=<selector>` plus query arguments
//! - `POST /invoke`        - invoke with `tool=<selector>` and a JSON body
//! - `GET  /export`        - integration records for every tool
//! - `POST /tools/refresh` - re-discover backend tools
//!
//! Everything except `/` and `/health` requires the API key when one is configured.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use http::{StatusCode, header};
use rmcp::model::JsonObject;
use serde_json::{Value, json};
use subtle::ConstantTimeEq;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::Gateway;
use crate::domains::tools::export::API_KEY_HEADER;
use crate::domains::tools::{InvocationSuccess, ToolError};

/// Query parameter carrying the tool selector.
const SELECTOR_PARAM: &str = "tool";

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    gateway: Gateway,
    api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(gateway: Gateway) -> Self {
        let api_key = gateway.config().auth.api_key.as_deref().map(Arc::from);
        Self { gateway, api_key }
    }
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport.
    pub async fn run(self, gateway: Gateway) -> TransportResult<()> {
        let addr = self.address();

        if gateway.config().auth.api_key.is_none() {
            warn!("MCP_API_KEY not set - the REST surface accepts unauthenticated requests");
        }

        let mut app = router(AppState::new(gateway));

        // Add CORS if enabled
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (REST, CORS {})", addr, cors_status);
        info!("  → Tools:   GET /tools");
        info!("  → Invoke:  GET|POST /invoke?tool=<name>");
        info!("  → Export:  GET /export");
        info!("  → Health:  GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Build the REST router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/tools", get(list_tools))
        .route("/tools/refresh", post(refresh_tools))
        .route("/invoke", get(invoke_query).post(invoke_payload))
        .route("/export", get(export_tools))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Reject requests that do not carry the configured API key.
///
/// Accepts either the `x-api-key` header or `Authorization: Bearer <key>`.
async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    let headers = request.headers();
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
        });
    let authorized = provided.is_some_and(|key| key_matches(key, expected));

    if authorized {
        next.run(request).await
    } else {
        warn!("Rejected unauthenticated request to {}", request.uri().path());
        error_response(StatusCode::UNAUTHORIZED, "Invalid or missing API key")
    }
}

/// Compare keys without leaking the matching prefix length through timing.
fn key_matches(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.gateway.name(),
        "version": state.gateway.version(),
        "transport": "HTTP",
        "endpoints": {
            "tools": "/tools",
            "invoke": "/invoke?tool=<name>",
            "export": "/export",
            "health": "/health"
        }
    }))
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let health = state.gateway.health().await;
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "backends": health.backends,
        "tools": health.tools
    }))
}

#[instrument(skip_all)]
async fn list_tools(State(state): State<AppState>) -> impl IntoResponse {
    info!("Processing tool listing request");
    Json(json!({ "tools": state.gateway.list_tools().await }))
}

#[instrument(skip_all)]
async fn refresh_tools(State(state): State<AppState>) -> impl IntoResponse {
    let count = state.gateway.refresh().await;
    Json(json!({ "success": true, "tools": count }))
}

#[instrument(skip_all)]
async fn export_tools(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.gateway.export().await)
}

/// Query-string channel: every parameter other than `tool` is an argument.
#[instrument(skip_all, fields(tool))]
async fn invoke_query(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let (selector, arguments) = split_selector(params);
    tracing::Span::current().record("tool", selector.as_deref().unwrap_or_default());

    invocation_response(state.gateway.invoke_query(selector.as_deref(), arguments).await)
}

/// Payload channel: the JSON body supplies the arguments.
#[instrument(skip_all, fields(tool))]
async fn invoke_payload(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Response {
    let (selector, _) = split_selector(params);
    tracing::Span::current().record("tool", selector.as_deref().unwrap_or_default());

    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    invocation_response(state.gateway.invoke_payload(selector.as_deref(), payload).await)
}

/// Separate the first `tool` parameter from the rest.
fn split_selector(params: Vec<(String, String)>) -> (Option<String>, Vec<(String, String)>) {
    let mut selector = None;
    let mut rest = Vec::with_capacity(params.len());
    for (key, value) in params {
        if key == SELECTOR_PARAM {
            selector.get_or_insert(value);
        } else {
            rest.push((key, value));
        }
    }
    (selector, rest)
}

/// An empty body is an empty payload; anything else must be a JSON object.
fn parse_payload(body: &[u8]) -> Result<JsonObject, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(JsonObject::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(payload)) => Ok(payload),
        Ok(_) => Err("Request body must be a JSON object".to_string()),
        Err(e) => Err(format!("Invalid JSON body: {}", e)),
    }
}

fn invocation_response(outcome: Result<InvocationSuccess, ToolError>) -> Response {
    match outcome {
        Ok(success) => Json(json!({
            "success": true,
            "result": success.result,
            "tool": success.tool,
            "backend": success.backend,
            "executionTime": success.elapsed_ms
        }))
        .into_response(),
        Err(e) => {
            let status = match e {
                ToolError::MissingToolName => StatusCode::BAD_REQUEST,
                ToolError::NotFound(_) => StatusCode::NOT_FOUND,
                ToolError::BackendUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                ToolError::ExecutionFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let mut body = json!({ "success": false, "error": e.to_string() });
            if let Some(elapsed_ms) = e.elapsed_ms() {
                body["executionTime"] = json!(elapsed_ms);
            }
            (status, Json(body)).into_response()
        }
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "success": false, "error": message.into() }))).into_response()
}
