//! gRPC client for the billing provisioning service.
//!
//! Adapts the `billing.v1.BillingService` contract from `api-shared` to the
//! core `BillingClient` trait. The channel connects lazily, so constructing
//! the client does not require the billing service to be reachable; the
//! first provisioning call does.

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};
use tonic::Code;
use uuid::Uuid;

use api_shared::pb;
use api_shared::pb::billing_service_client::BillingServiceClient;
use carelink_core::{BillingAck, BillingClient, BillingError};

/// A `BillingClient` speaking gRPC to a remote billing service.
#[derive(Clone)]
pub struct GrpcBillingClient {
    client: BillingServiceClient<Channel>,
}

impl GrpcBillingClient {
    /// Creates a client for the billing service at `endpoint`
    /// (e.g. `http://billing:9001`).
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URI is malformed. Connectivity is
    /// not checked here; the channel connects on first use.
    pub fn new(endpoint: String) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(endpoint)?.connect_lazy();
        Ok(Self {
            client: BillingServiceClient::new(channel),
        })
    }
}

#[async_trait]
impl BillingClient for GrpcBillingClient {
    async fn create_billing_account(
        &self,
        patient_id: Uuid,
        name: &str,
        email: &str,
    ) -> Result<BillingAck, BillingError> {
        let req = pb::BillingAccountReq {
            patient_id: patient_id.to_string(),
            name: name.to_owned(),
            email: email.to_owned(),
        };

        // tonic clients take &mut self; the client is cheap to clone and
        // shares the underlying channel.
        let mut client = self.client.clone();
        match client.create_billing_account(tonic::Request::new(req)).await {
            Ok(res) => {
                let res = res.into_inner();
                tracing::info!(
                    %patient_id,
                    account_id = %res.account_id,
                    status = %res.status,
                    "billing account created"
                );
                Ok(BillingAck {
                    account_id: res.account_id,
                })
            }
            Err(status) => {
                tracing::error!(%patient_id, code = ?status.code(), "billing RPC failed");
                Err(map_status(status))
            }
        }
    }
}

/// Maps a gRPC status to the core billing error taxonomy.
///
/// Transport-level failures (the service cannot be reached or answered too
/// late) are `Unavailable`; anything the service itself answered with is a
/// `Rejected`.
fn map_status(status: tonic::Status) -> BillingError {
    match status.code() {
        Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled => {
            BillingError::Unavailable(status.message().to_owned())
        }
        _ => BillingError::Rejected(status.message().to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_service_maps_to_unavailable() {
        let err = map_status(tonic::Status::unavailable("connection refused"));
        assert!(matches!(err, BillingError::Unavailable(_)));
    }

    #[test]
    fn deadline_maps_to_unavailable() {
        let err = map_status(tonic::Status::deadline_exceeded("too slow"));
        assert!(matches!(err, BillingError::Unavailable(_)));
    }

    #[test]
    fn application_refusal_maps_to_rejected() {
        let err = map_status(tonic::Status::invalid_argument("bad email"));
        assert!(matches!(err, BillingError::Rejected(_)));
    }

    #[tokio::test]
    async fn rejects_malformed_endpoint() {
        assert!(GrpcBillingClient::new("not a uri".into()).is_err());
    }

    #[tokio::test]
    async fn accepts_lazy_endpoint_without_a_live_service() {
        assert!(GrpcBillingClient::new("http://127.0.0.1:9001".into()).is_ok());
    }
}
