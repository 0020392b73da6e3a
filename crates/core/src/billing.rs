//! Contract for the remote billing provisioning collaborator.
//!
//! Provisioning is a synchronous remote call issued once per successful
//! patient creation. The remote side owns idempotency: retrying with the same
//! patient id must yield the same billing account, never a duplicate. The
//! orchestrator reports failures, it does not retry inline.

use async_trait::async_trait;
use uuid::Uuid;

/// Errors reported by a billing client.
#[derive(Debug, thiserror::Error)]
pub enum BillingError {
    /// The billing service could not be reached or answered too late.
    #[error("billing service unavailable: {0}")]
    Unavailable(String),
    /// The billing service answered and refused the request.
    #[error("billing service rejected the request: {0}")]
    Rejected(String),
    /// The call exceeded the orchestrator's deadline.
    #[error("billing call timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Acknowledgement of a provisioned billing account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillingAck {
    pub account_id: String,
}

/// A client able to provision billing accounts for new patients.
#[async_trait]
pub trait BillingClient: Send + Sync {
    /// Provisions a billing account for the given patient.
    ///
    /// # Errors
    ///
    /// Returns a `BillingError` if the remote call fails or is refused.
    async fn create_billing_account(
        &self,
        patient_id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<BillingAck, BillingError>;
}
