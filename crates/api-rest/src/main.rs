//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want the
//! REST server (with OpenAPI/Swagger UI). The workspace's main `medpulse-run`
//! binary additionally logs committed queue events.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_router, AppState};
use medpulse_core::config::{jitter_seed_from_env_value, rest_addr_from_env_value};
use medpulse_core::{EngineConfig, MemoryStore, TriageQueue};

/// Main entry point for the MedPulse REST API server
///
/// Starts the REST API server on the configured address (default: 0.0.0.0:3000).
/// Provides HTTP endpoints for triage intake and queue views with
/// OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `MEDPULSE_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `MEDPULSE_JITTER_SEED`: Fixed jitter seed for reproducible scoring
///
/// # Returns
/// * `Ok(())` - If server starts and runs successfully
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configured address or seed cannot be parsed, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = rest_addr_from_env_value(std::env::var("MEDPULSE_REST_ADDR").ok())?;
    let jitter_seed = jitter_seed_from_env_value(std::env::var("MEDPULSE_JITTER_SEED").ok())?;
    let cfg = EngineConfig::new(rest_addr, jitter_seed);

    tracing::info!("-- Starting MedPulse REST API on {}", cfg.rest_addr());

    let queue = Arc::new(TriageQueue::from_config(MemoryStore::new(), &cfg));
    let app = build_router(AppState::new(queue));

    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
