use thiserror::Error;

use crate::db_types::{GatewayCredentials, TxReference, VerificationResult};

/// A client capable of verifying a transaction reference with the payment provider.
///
/// The verification call is the only source of truth about a transaction: pushed webhook payloads are never trusted
/// directly, so every reconciliation goes through this trait exactly once.
#[allow(async_fn_in_trait)]
pub trait GatewayClient {
    /// Issues a single outbound verification call for `reference` using the given gateway credentials.
    ///
    /// Implementations must bound the call with a timeout and must not retry; a second delivery attempt, if any,
    /// comes from the provider's own retry policy.
    async fn verify(
        &self,
        reference: &TxReference,
        credentials: &GatewayCredentials,
    ) -> Result<VerificationResult, GatewayError>;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("The provider rejected the verification call. Status {status}. {message}")]
    Gateway { status: u16, message: String },
    #[error("Could not reach the provider. {0}")]
    Unreachable(String),
    #[error("The verification call did not complete in time")]
    Timeout,
    #[error("The provider response was missing required fields. {0}")]
    MalformedResponse(String),
}
