//! Durable keyed storage for patient records.
//!
//! The store is the final arbiter of the email uniqueness invariant: the
//! orchestrator's `exists_by_email` pre-check is an optimisation only, and
//! two concurrent writers that both pass it must still be serialised here,
//! with the loser rejected as `DuplicateEmail`. Implementations therefore
//! have to make the uniqueness check and the write atomic: a unique index
//! for a relational store, a single write guard for the in-memory one.

use async_trait::async_trait;
use carelink_types::EmailAddress;
use uuid::Uuid;

use crate::error::PatientResult;
use crate::patient::{NewPatient, Patient, PatientUpdate};

mod memory;

pub use memory::MemoryStore;

/// Contract for patient persistence.
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Returns all stored patients.
    ///
    /// No ordering is guaranteed beyond stability within a single snapshot
    /// read.
    async fn list(&self) -> PatientResult<Vec<Patient>>;

    /// Looks up a patient by id.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if no record has this id.
    async fn find_by_id(&self, id: Uuid) -> PatientResult<Patient>;

    /// Reports whether any stored patient uses `email`.
    ///
    /// `exclude` lets an update check uniqueness against all *other* records,
    /// so a patient keeping its own email does not collide with itself.
    async fn exists_by_email(
        &self,
        email: &EmailAddress,
        exclude: Option<Uuid>,
    ) -> PatientResult<bool>;

    /// Inserts a new record, assigning its id.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::DuplicateEmail` if the email is already in use,
    /// even when the caller's pre-check passed (lost race).
    async fn insert(&self, new: NewPatient) -> PatientResult<Patient>;

    /// Persists mutations to an existing record.
    ///
    /// `id` and `registered_date` are never touched.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if no record has this id, or
    /// `PatientError::DuplicateEmail` if the new email collides with another
    /// record.
    async fn update(&self, id: Uuid, update: PatientUpdate) -> PatientResult<Patient>;

    /// Removes a record.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if no record has this id. Deleting an
    /// absent record is a reportable condition, not a silent no-op.
    async fn delete_by_id(&self, id: Uuid) -> PatientResult<()>;
}
