//! # Carelink Core
//!
//! Core business logic for the carelink patient management service.
//!
//! This crate contains the domain model and the orchestration around a single
//! patient mutation:
//! - The `Patient` entity and its validated field types
//! - The `PatientStore` contract plus an in-memory implementation
//! - Contracts for the billing provisioning client and the event publisher
//! - The `PatientService` orchestrator that sequences storage, billing and
//!   event publication for create/update/delete
//!
//! **No API concerns**: HTTP servers, gRPC transport and wire DTOs belong in
//! `api-rest`, `billing-grpc` and `api-shared`.

pub mod billing;
pub mod config;
pub mod error;
pub mod events;
pub mod patient;
pub mod service;
pub mod store;

pub use billing::{BillingAck, BillingClient, BillingError};
pub use config::{billing_timeout_from_env_value, CoreConfig};
pub use error::{PatientError, PatientResult};
pub use events::{EventPublisher, PatientCreatedEvent};
pub use patient::{NewPatient, Patient, PatientUpdate};
pub use service::PatientService;
pub use store::{MemoryStore, PatientStore};
