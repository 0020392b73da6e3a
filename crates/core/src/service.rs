//! Patient service and mutation orchestration.
//!
//! This module owns the cross-cutting knowledge of a patient mutation: the
//! ordering of store write, billing provisioning and event publication, and
//! the partial-failure policy between them. The collaborators themselves are
//! single-purpose and mutually unaware of each other.
//!
//! Failure policy for create:
//! - a store rejection (duplicate email, storage fault) aborts the operation
//!   before billing or events are touched;
//! - a billing failure after the persist is surfaced to the caller as
//!   `BillingProvisioning`, but the record stays; reconciliation is an
//!   out-of-band concern;
//! - an event delivery failure is never surfaced; the record's existence is
//!   authoritative, not the notification.

use std::sync::Arc;

use uuid::Uuid;

use crate::billing::{BillingClient, BillingError};
use crate::config::CoreConfig;
use crate::error::{PatientError, PatientResult};
use crate::events::{EventPublisher, PatientCreatedEvent};
use crate::patient::{NewPatient, Patient, PatientUpdate};
use crate::store::PatientStore;

/// Orchestrates storage, billing provisioning and event publication for
/// patient mutations.
///
/// The service is stateless and safe to call concurrently; the store's save
/// path is the only cross-request synchronisation point. Dependencies are
/// injected through the constructor. A `None` billing client selects the
/// billing-free deployment mode: creates persist and publish events but
/// provision nothing.
#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn PatientStore>,
    billing: Option<Arc<dyn BillingClient>>,
    publisher: Arc<dyn EventPublisher>,
    cfg: CoreConfig,
}

impl PatientService {
    /// Creates a new instance of PatientService.
    ///
    /// # Arguments
    ///
    /// * `store` - Durable patient storage, the atomic arbiter of email
    ///   uniqueness.
    /// * `billing` - Remote billing provisioning client, or `None` to run
    ///   without billing.
    /// * `publisher` - Sink for patient lifecycle events.
    /// * `cfg` - Core configuration resolved at startup.
    pub fn new(
        store: Arc<dyn PatientStore>,
        billing: Option<Arc<dyn BillingClient>>,
        publisher: Arc<dyn EventPublisher>,
        cfg: CoreConfig,
    ) -> Self {
        Self {
            store,
            billing,
            publisher,
            cfg,
        }
    }

    /// Returns all stored patients.
    pub async fn list(&self) -> PatientResult<Vec<Patient>> {
        self.store.list().await
    }

    /// Looks up a single patient.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if no record has this id.
    pub async fn get(&self, id: Uuid) -> PatientResult<Patient> {
        self.store.find_by_id(id).await
    }

    /// Creates a patient record, provisions billing and announces the
    /// creation.
    ///
    /// The email pre-check is an early exit only; the store's insert is the
    /// final arbiter and a lost race still comes back as `DuplicateEmail`
    /// with no billing call and no event. Once the record is persisted it is
    /// never rolled back: a billing failure surfaces as
    /// `BillingProvisioning` naming the persisted id, and the creation event
    /// is published regardless of the billing outcome.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEmail`, `Storage`, or `BillingProvisioning` (the
    /// latter only after a successful persist).
    pub async fn create(&self, draft: NewPatient) -> PatientResult<Patient> {
        if self.store.exists_by_email(&draft.email, None).await? {
            return Err(PatientError::DuplicateEmail(draft.email));
        }

        let patient = self.store.insert(draft).await?;
        tracing::info!(patient_id = %patient.id, "patient record persisted");

        let billing_outcome = match &self.billing {
            Some(client) => self.provision_billing(client.as_ref(), &patient).await,
            None => Ok(()),
        };

        self.publisher
            .publish(PatientCreatedEvent::for_patient(&patient));

        billing_outcome.map(|()| patient)
    }

    /// Applies the mutable fields to an existing patient.
    ///
    /// Updates trigger no billing call and no event; only creation does.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` if the record is absent (checked
    /// before uniqueness, so absence and collision stay distinct), or
    /// `PatientError::DuplicateEmail` if the new email belongs to another
    /// patient. A patient keeping its own email is not a collision.
    pub async fn update(&self, id: Uuid, update: PatientUpdate) -> PatientResult<Patient> {
        self.store.find_by_id(id).await?;

        if self.store.exists_by_email(&update.email, Some(id)).await? {
            return Err(PatientError::DuplicateEmail(update.email));
        }

        self.store.update(id, update).await
    }

    /// Removes a patient record.
    ///
    /// # Errors
    ///
    /// Returns `PatientError::NotFound` for an absent id.
    pub async fn delete(&self, id: Uuid) -> PatientResult<()> {
        self.store.delete_by_id(id).await
    }

    async fn provision_billing(
        &self,
        client: &dyn BillingClient,
        patient: &Patient,
    ) -> PatientResult<()> {
        let deadline = self.cfg.billing_timeout();
        let call =
            client.create_billing_account(patient.id, patient.name.as_str(), patient.email.as_str());

        match tokio::time::timeout(deadline, call).await {
            Ok(Ok(ack)) => {
                tracing::info!(
                    patient_id = %patient.id,
                    account_id = %ack.account_id,
                    "billing account provisioned"
                );
                Ok(())
            }
            Ok(Err(source)) => {
                tracing::error!(patient_id = %patient.id, error = %source, "billing provisioning failed");
                Err(PatientError::BillingProvisioning {
                    patient_id: patient.id,
                    source,
                })
            }
            Err(_elapsed) => {
                tracing::error!(patient_id = %patient.id, ?deadline, "billing provisioning timed out");
                Err(PatientError::BillingProvisioning {
                    patient_id: patient.id,
                    source: BillingError::Timeout(deadline),
                })
            }
        }
    }
}
