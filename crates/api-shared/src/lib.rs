//! # API Shared
//!
//! Shared utilities and definitions for carelink APIs.
//!
//! Contains:
//! - Protobuf-generated billing types (`pb` module)
//! - Shared services like `HealthService`
//!
//! Used by `billing-grpc` for the outbound provisioning contract and by
//! `api-rest` for common responses.

// Re-export the generated protobuf module. The generated code will be placed
// into OUT_DIR at build time by the build script.
pub mod pb {
    tonic::include_proto!("billing.v1");
}

pub mod health;

pub use health::{HealthRes, HealthService};
