//! MCP Gateway Entry Point
//!
//! Initializes logging, loads configuration, connects to every configured
//! backend and serves the merged tools with the configured transport.

use anyhow::Result;
use tracing::{Level, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use mcp_gateway::core::{Config, Gateway, TransportService};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);

    let backends = &config.backends;
    if backends.loaded {
        info!(
            "Loaded {} backend(s) from {}",
            backends.servers.len(),
            backends.file.display()
        );
    } else {
        warn!(
            "Backend settings {} not found - no tools will be available",
            backends.file.display()
        );
    }

    let transport = TransportService::new(config.transport.clone());

    // Connect backends and discover their tools
    let gateway = Gateway::connect(config).await;

    info!("Gateway initialized");

    transport.run(gateway).await?;

    info!("Gateway shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr so the STDIO transport keeps stdout for protocol traffic.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
