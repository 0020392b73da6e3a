//! Patient lifecycle events and the publisher contract.
//!
//! Publication is fire-and-forget relative to the request path: `publish`
//! must not block the caller, and a delivery failure must never undo the
//! persisted write or the billing call. Downstream consumers rely only on
//! the event schema defined here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::patient::Patient;

/// Announcement that a patient record was created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientCreatedEvent {
    pub patient_id: Uuid,
    pub name: String,
    pub email: String,
    pub timestamp: DateTime<Utc>,
}

impl PatientCreatedEvent {
    /// Builds the event for a freshly persisted patient, stamped now.
    pub fn for_patient(patient: &Patient) -> Self {
        Self {
            patient_id: patient.id,
            name: patient.name.as_str().to_owned(),
            email: patient.email.as_str().to_owned(),
            timestamp: Utc::now(),
        }
    }
}

/// A sink for patient lifecycle events.
///
/// Implementations must return immediately; queueing and delivery happen off
/// the caller's task. There is no error channel back to the caller: the
/// record's existence is authoritative, not the notification.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: PatientCreatedEvent);
}
