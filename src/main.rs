use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_router, AppState};
use medpulse_core::config::{jitter_seed_from_env_value, rest_addr_from_env_value};
use medpulse_core::{EngineConfig, MemoryStore, QueueEvent, TriageQueue};

/// Main entry point for the MedPulse application
///
/// Builds the in-memory queue engine, starts the REST server and logs every
/// committed queue event from the engine's broadcast channel.
///
/// # Environment Variables
/// - `MEDPULSE_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `MEDPULSE_JITTER_SEED`: Fixed jitter seed for reproducible scoring
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medpulse=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = rest_addr_from_env_value(std::env::var("MEDPULSE_REST_ADDR").ok())?;
    let jitter_seed = jitter_seed_from_env_value(std::env::var("MEDPULSE_JITTER_SEED").ok())?;
    let cfg = EngineConfig::new(rest_addr, jitter_seed);

    tracing::info!("++ Starting MedPulse REST on {}", cfg.rest_addr());

    let queue = Arc::new(TriageQueue::from_config(MemoryStore::new(), &cfg));

    // Surface the engine's change feed in the logs so queue movements are
    // observable without polling.
    let mut events = queue.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(QueueEvent::PatientAdmitted {
                    patient_id,
                    queue_position,
                    severity_score,
                }) => {
                    tracing::info!(
                        %patient_id,
                        queue_position,
                        severity_score,
                        "queue event: patient admitted"
                    );
                }
                Ok(QueueEvent::StatusChanged { patient_id, status }) => {
                    tracing::info!(%patient_id, %status, "queue event: status changed");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "queue event logger lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let app = build_router(AppState::new(queue));

    let listener = tokio::net::TcpListener::bind(cfg.rest_addr()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
