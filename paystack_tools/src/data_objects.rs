use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Top-level envelope returned by `GET /transaction/verify/{reference}`.
///
/// `status` is the *call* status, not the transaction status; the latter lives in [`TransactionData::status`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyEnvelope {
    pub status: bool,
    pub message: String,
    pub data: TransactionData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    pub id: i64,
    pub reference: String,
    /// Amount in minor currency units (kobo).
    pub amount: i64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub gateway_response: Option<String>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub metadata: TransactionMetadata,
}

/// Back-references embedded by the application when the payment was initiated and echoed verbatim by Paystack.
///
/// Every field is optional on the wire; which of them are required is decided by the consumer, not the codec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionMetadata {
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub doctype: Option<String>,
    #[serde(default)]
    pub docname: Option<String>,
    #[serde(default)]
    pub reference_doctype: Option<String>,
    #[serde(default)]
    pub reference_name: Option<String>,
}
