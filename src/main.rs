//! Main entry point for the carelink patient service.
//!
//! Resolves configuration from the environment once at startup, wires the
//! orchestrator's collaborators explicitly, and serves the REST API:
//! - store: PostgreSQL when `CARELINK_DATABASE_URL` is set, in-memory
//!   otherwise
//! - billing: gRPC client when `CARELINK_BILLING_ADDR` is set, disabled
//!   otherwise (the billing-free deployment mode)
//! - events: HTTP stream gateway when `CARELINK_EVENTS_URL` is set, log
//!   transport otherwise

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::AppState;
use billing_grpc::GrpcBillingClient;
use carelink_core::{
    billing_timeout_from_env_value, BillingClient, CoreConfig, MemoryStore, PatientService,
    PatientStore,
};
use event_stream::{EventTransport, HttpTransport, LogTransport, StreamPublisher};
use store_postgres::PostgresStore;

/// # Environment Variables
/// - `CARELINK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CARELINK_DATABASE_URL`: PostgreSQL connection string (unset: in-memory store)
/// - `CARELINK_BILLING_ADDR`: billing service gRPC endpoint (unset: billing disabled)
/// - `CARELINK_BILLING_TIMEOUT_MS`: billing call deadline in milliseconds (default: 5000)
/// - `CARELINK_EVENTS_URL`: stream gateway base URL (unset: events to log)
/// - `CARELINK_EVENTS_TOPIC`: stream topic (default: "patient-lifecycle")
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carelink=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CARELINK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let billing_timeout =
        billing_timeout_from_env_value(std::env::var("CARELINK_BILLING_TIMEOUT_MS").ok())?;
    let cfg = CoreConfig::new(billing_timeout)?;

    let store: Arc<dyn PatientStore> = match std::env::var("CARELINK_DATABASE_URL") {
        Ok(url) => {
            let store = PostgresStore::new(&url)?;
            store.ensure_schema().await?;
            tracing::info!("using PostgreSQL patient store");
            Arc::new(store)
        }
        Err(_) => {
            tracing::warn!("CARELINK_DATABASE_URL not set, using in-memory patient store");
            Arc::new(MemoryStore::new())
        }
    };

    let billing: Option<Arc<dyn BillingClient>> = match std::env::var("CARELINK_BILLING_ADDR") {
        Ok(addr) => {
            tracing::info!("billing provisioning via {}", addr);
            Some(Arc::new(GrpcBillingClient::new(addr)?))
        }
        Err(_) => {
            tracing::warn!("CARELINK_BILLING_ADDR not set, billing provisioning disabled");
            None
        }
    };

    let topic =
        std::env::var("CARELINK_EVENTS_TOPIC").unwrap_or_else(|_| "patient-lifecycle".into());
    let transport: Arc<dyn EventTransport> = match std::env::var("CARELINK_EVENTS_URL") {
        Ok(url) => {
            tracing::info!("publishing patient events to {}", url);
            Arc::new(HttpTransport::new(url))
        }
        Err(_) => {
            tracing::warn!("CARELINK_EVENTS_URL not set, patient events go to the log");
            Arc::new(LogTransport)
        }
    };
    let publisher = Arc::new(StreamPublisher::spawn(topic, transport));

    let service = PatientService::new(store, billing, publisher, cfg);

    tracing::info!("++ Starting carelink REST on {}", rest_addr);
    api_rest::serve(&rest_addr, AppState::new(service)).await?;

    Ok(())
}
