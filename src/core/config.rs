//! Configuration management for the gateway.
//!
//! Values come from environment variables (optionally via a `.env` file); the
//! list of backends comes from a JSON settings document whose path is itself
//! configurable.

use super::error::{Error, Result};
use super::transport::TransportConfig;
use crate::domains::tools::CollisionPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Default location of the backend settings document.
pub const DEFAULT_BACKENDS_FILE: &str = "mcp-servers.json";

/// Main configuration structure for the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Credential required by the HTTP surface.
    pub auth: AuthConfig,

    /// Backends to connect to and how to merge their tools.
    pub backends: BackendsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,

    /// Externally reachable base URL, used in exported callback URLs.
    pub public_url: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// API key configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// When unset, the HTTP surface is open.
    pub api_key: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Backend settings and merge policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsConfig {
    /// Settings document the backends are read from.
    pub file: PathBuf,

    /// Whether `file` existed and was loaded.
    #[serde(skip)]
    pub loaded: bool,

    /// Backends in connection order.
    pub servers: Vec<BackendSettings>,

    /// How tool name collisions between backends are resolved.
    pub collision_policy: CollisionPolicy,
}

/// How to start one backend process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Stable backend name, taken from its key in the settings document.
    #[serde(skip)]
    pub name: String,

    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// On-disk shape of the settings document.
#[derive(Debug, Deserialize)]
struct BackendsFile {
    #[serde(rename = "mcpServers", default)]
    mcp_servers: serde_json::Map<String, serde_json::Value>,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_BACKENDS_FILE),
            loaded: false,
            servers: Vec::new(),
            collision_policy: CollisionPolicy::default(),
        }
    }
}

impl BackendsConfig {
    /// Read backend settings from a JSON document.
    ///
    /// Backends keep the order in which the document declares them.
    pub fn load(path: &Path) -> Result<Vec<BackendSettings>> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Parse a settings document.
    pub fn parse(raw: &str) -> Result<Vec<BackendSettings>> {
        let file: BackendsFile = serde_json::from_str(raw)?;

        file.mcp_servers
            .into_iter()
            .map(|(name, value)| -> Result<BackendSettings> {
                let mut settings: BackendSettings = serde_json::from_value(value)
                    .map_err(|e| Error::config(format!("backend '{}': {}", name, e)))?;
                settings.name = name;
                Ok(settings)
            })
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "mcp-gateway".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                public_url: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            auth: AuthConfig::default(),
            backends: BackendsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_LOG_LEVEL`, `MCP_BACKENDS_FILE`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(public_url) = std::env::var("MCP_PUBLIC_URL") {
            config.server.public_url = Some(public_url);
        }

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        config.auth.api_key = std::env::var("MCP_API_KEY").ok().filter(|key| !key.is_empty());

        if let Ok(policy) = std::env::var("MCP_COLLISION_POLICY") {
            config.backends.collision_policy = policy.parse().map_err(Error::config)?;
        }

        if let Ok(file) = std::env::var("MCP_BACKENDS_FILE") {
            config.backends.file = PathBuf::from(file);
        }

        // Logging is not initialized yet; callers report `loaded` themselves.
        if config.backends.file.exists() {
            config.backends.servers = BackendsConfig::load(&config.backends.file)?;
            config.backends.loaded = true;
        }

        Ok(config)
    }

    /// Base URL used in exported callback URLs.
    pub fn public_url(&self) -> String {
        if let Some(url) = &self.server.public_url {
            return url.clone();
        }
        self.transport.default_public_url()
    }
}
