//! Tuition Core - API Server Binary
//!
//! This binary starts the HTTP API server for the tuition ledger.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin tuition-api
//!
//! # Run with environment variables
//! TUITION_HOST=0.0.0.0 TUITION_PORT=8080 TUITION_TIMEZONE=Asia/Dhaka cargo run --bin tuition-api
//! ```
//!
//! # Environment Variables
//!
//! * `TUITION_HOST` - Server host (default: 0.0.0.0)
//! * `TUITION_PORT` - Server port (default: 8080)
//! * `TUITION_CURRENCY` - ISO 4217 currency code (default: BDT)
//! * `TUITION_TIMEZONE` - IANA campus timezone (default: Asia/Dhaka)
//! * `TUITION_ALLOCATION_RETRIES` - Replans after a write conflict (default: 3)
//! * `TUITION_LEDGER_PAGE_SIZE` - Ledger entries per page (default: 10)
//! * `TUITION_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)

use anyhow::Context;
use infra_store::MemoryStore;
use interface_api::{config::ApiConfig, create_router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, wires the storage backend,
/// and starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The configured currency or timezone does not parse
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    // Load configuration from environment
    let config = load_config();

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        timezone = %config.timezone,
        "Starting Tuition Core API Server"
    );

    let currency = config
        .currency()
        .with_context(|| format!("invalid TUITION_CURRENCY {:?}", config.currency))?;
    let clock = config
        .clock()
        .with_context(|| format!("invalid TUITION_TIMEZONE {:?}", config.timezone))?;

    // Wire the storage backend. The roster starts empty; students and
    // enrollments arrive through the roster adapter sharing this store.
    let store = MemoryStore::new();

    // Create the API router
    let app = create_router(store, clock, currency, config.clone());

    // Parse server address
    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables.
///
/// Falls back to default values if environment variables are not set.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|_| {
        // Fall back to individual env vars or defaults
        let defaults = ApiConfig::default();
        ApiConfig {
            host: std::env::var("TUITION_HOST").unwrap_or(defaults.host),
            port: std::env::var("TUITION_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            currency: std::env::var("TUITION_CURRENCY").unwrap_or(defaults.currency),
            timezone: std::env::var("TUITION_TIMEZONE").unwrap_or(defaults.timezone),
            allocation_retries: std::env::var("TUITION_ALLOCATION_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.allocation_retries),
            ledger_page_size: std::env::var("TUITION_LEDGER_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.ledger_page_size),
            log_level: std::env::var("TUITION_LOG_LEVEL")
                .or_else(|_| std::env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
        }
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// # Arguments
///
/// * `log_level` - The minimum log level to output (trace, debug, info, warn, error)
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
