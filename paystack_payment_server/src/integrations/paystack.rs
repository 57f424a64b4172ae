//! Adapter between the Paystack REST client and the engine's gateway seam.
//!
//! This is where the loosely-typed wire envelope becomes the engine's typed [`VerificationResult`]. A payload with
//! missing back-references or an unknown status string is rejected as malformed here, at the boundary, rather than
//! defaulting its way into the ledger.
use paystack_payment_engine::{
    db_types::{GatewayCredentials, TransactionMetadata, TransactionStatus, TxReference, VerificationResult},
    traits::{GatewayClient, GatewayError},
};
use paystack_tools::{PaystackApi, PaystackApiError, TransactionMetadata as WireMetadata, VerifyEnvelope};
use pps_common::Kobo;

#[derive(Debug, Clone)]
pub struct PaystackGateway {
    api: PaystackApi,
}

impl PaystackGateway {
    pub fn new(api: PaystackApi) -> Self {
        Self { api }
    }
}

impl GatewayClient for PaystackGateway {
    async fn verify(
        &self,
        reference: &TxReference,
        credentials: &GatewayCredentials,
    ) -> Result<VerificationResult, GatewayError> {
        let envelope =
            self.api.verify_transaction(reference.as_str(), &credentials.secret_key).await.map_err(convert_error)?;
        verification_from_envelope(envelope)
    }
}

fn convert_error(e: PaystackApiError) -> GatewayError {
    match e {
        PaystackApiError::Timeout => GatewayError::Timeout,
        PaystackApiError::QueryError { status, message } => GatewayError::Gateway { status, message },
        PaystackApiError::MalformedResponse(s) => GatewayError::MalformedResponse(s),
        other => GatewayError::Unreachable(other.to_string()),
    }
}

/// Validates the wire envelope into the engine's verification result.
pub fn verification_from_envelope(envelope: VerifyEnvelope) -> Result<VerificationResult, GatewayError> {
    let raw = serde_json::to_value(&envelope).map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
    let data = envelope.data;
    let status = data.status.parse::<TransactionStatus>().map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
    let metadata = metadata_from_wire(data.metadata)?;
    Ok(VerificationResult {
        reference: TxReference::from(data.reference),
        status,
        amount: Kobo::from(data.amount),
        currency: data.currency,
        message: envelope.message,
        transaction_id: data.id,
        metadata,
        raw,
    })
}

fn metadata_from_wire(metadata: WireMetadata) -> Result<TransactionMetadata, GatewayError> {
    fn required(field: Option<String>, name: &str) -> Result<String, GatewayError> {
        field
            .filter(|value| !value.is_empty())
            .ok_or_else(|| GatewayError::MalformedResponse(format!("metadata is missing the '{name}' field")))
    }
    Ok(TransactionMetadata {
        gateway: metadata.gateway,
        doctype: required(metadata.doctype, "doctype")?,
        docname: required(metadata.docname, "docname")?,
        reference_doctype: required(metadata.reference_doctype, "reference_doctype")?,
        reference_name: required(metadata.reference_name, "reference_name")?,
    })
}
