//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own, against an in-memory store with
//! billing disabled and events delivered to the log.
//!
//! ## Intended use
//! This binary is useful for development and debugging when you only want
//! the REST server (with OpenAPI/Swagger UI). The workspace's main
//! `carelink-run` binary wires the real store, billing client and event
//! transport.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use carelink_core::{CoreConfig, MemoryStore, PatientService};
use event_stream::{LogTransport, StreamPublisher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CARELINK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting carelink REST API on {}", addr);
    tracing::info!("-- In-memory store, billing disabled, events to log");

    let publisher = Arc::new(StreamPublisher::spawn(
        "patient-lifecycle".into(),
        Arc::new(LogTransport),
    ));
    let service = PatientService::new(
        Arc::new(MemoryStore::new()),
        None,
        publisher,
        CoreConfig::default(),
    );

    api_rest::serve(&addr, AppState::new(service)).await?;

    Ok(())
}
