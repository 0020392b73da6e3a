use carelink_types::EmailAddress;
use uuid::Uuid;

use crate::billing::BillingError;

/// Errors produced by patient operations.
///
/// `DuplicateEmail` and `NotFound` are expected business outcomes and leave
/// no state behind. `BillingProvisioning` is reported *after* the patient
/// record has been persisted; the record named by `patient_id` exists and is
/// not rolled back. `Storage` is a transport/availability fault of the store
/// and aborts the whole operation with nothing persisted.
#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("a patient with email {0} already exists")]
    DuplicateEmail(EmailAddress),
    #[error("patient not found: {0}")]
    NotFound(Uuid),
    #[error("billing provisioning failed for persisted patient {patient_id}: {source}")]
    BillingProvisioning {
        patient_id: Uuid,
        #[source]
        source: BillingError,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;
