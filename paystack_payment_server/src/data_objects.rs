use std::fmt::Display;

use paystack_payment_engine::db_types::TxReference;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The form body Paystack posts to the webhook endpoint: a single `data` field holding a JSON-encoded envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub data: String,
}

/// The subset of the pushed envelope the server reads. Everything else in the push — including its claimed status —
/// is ignored; the reference is re-verified with the provider before any state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    pub reference: TxReference,
    pub metadata: WebhookMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookMetadata {
    /// Name of the gateway-settings document to resolve credentials from.
    pub gateway: String,
}

/// Client verification poll request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub reference: TxReference,
    pub gateway: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapParams {
    pub reference_doctype: String,
    pub reference_docname: String,
}

/// Everything the payment page needs to start a Paystack checkout for an inward payment request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequestBootstrap {
    pub name: String,
    pub email: Option<String>,
    pub currency: String,
    pub status: String,
    pub public_key: String,
    pub metadata: BootstrapMetadata,
}

/// Echoed back by the provider on verification; this is what ties a provider transaction to its documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapMetadata {
    pub doctype: String,
    pub docname: String,
    pub reference_doctype: String,
    pub reference_name: String,
    pub gateway: String,
}
