use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use pps_common::{Kobo, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, Type};
use thiserror::Error;

pub const PAYMENT_REQUEST_DOCTYPE: &str = "Payment Request";
pub const INTEGRATION_REQUEST_DOCTYPE: &str = "Integration Request";
pub const SALES_ORDER_DOCTYPE: &str = "Sales Order";

//--------------------------------------      TxReference      -------------------------------------------------------
/// The opaque transaction reference issued by the payment provider. This is the natural primary key for the
/// reconciliation ledger; it never changes once the provider has issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct TxReference(pub String);

impl FromStr for TxReference {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for TxReference {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for TxReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TxReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   TransactionStatus   -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// The charge went through; the purchase must be fulfilled.
    Success,
    /// The charge was attempted and declined. The attempt is still recorded.
    Failed,
    /// The provider has not reached a final verdict yet.
    Pending,
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Success => write!(f, "success"),
            TransactionStatus::Failed => write!(f, "failed"),
            TransactionStatus::Pending => write!(f, "pending"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct ConversionError(String);

impl FromStr for TransactionStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "pending" => Ok(Self::Pending),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------  TransactionMetadata  -------------------------------------------------------
/// The back-references this application embedded when the payment was initiated, echoed back by the provider.
/// By the time a value of this type exists, the required fields have been validated at the gateway boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionMetadata {
    /// Name of the gateway-settings document holding the credentials used for this payment.
    pub gateway: Option<String>,
    /// Doctype of the originating payment request.
    pub doctype: String,
    /// Name of the originating payment request.
    pub docname: String,
    /// Doctype of the source order the payment request was raised against.
    pub reference_doctype: String,
    /// Name of the source order.
    pub reference_name: String,
}

//--------------------------------------  VerificationResult   -------------------------------------------------------
/// The normalized result of a provider verification call.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub reference: TxReference,
    pub status: TransactionStatus,
    /// Amount in minor units, exactly as the provider reported it.
    pub amount: Kobo,
    pub currency: String,
    /// The provider's human-readable message for the verification call.
    pub message: String,
    /// The provider-side numeric transaction id.
    pub transaction_id: i64,
    pub metadata: TransactionMetadata,
    /// The full provider envelope, kept for audit storage.
    pub raw: Value,
}

//--------------------------------------     LedgerEntry       -------------------------------------------------------
/// A row in the reconciliation ledger. Exactly one entry exists per transaction reference; creating it is the
/// synchronization point that makes every other delivery of the same transaction a no-op.
#[derive(Debug, Clone, FromRow)]
pub struct LedgerEntry {
    pub id: i64,
    /// Amount in major currency units (minor units / 100).
    pub amount: f64,
    pub currency: String,
    pub message: String,
    pub status: TransactionStatus,
    pub reference: TxReference,
    /// Name of the payment request this transaction settles.
    pub payment_request: String,
    pub reference_doctype: String,
    pub reference_name: String,
    pub transaction_id: i64,
    /// The raw provider envelope as received at verification time.
    #[sqlx(json)]
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub amount: f64,
    pub currency: String,
    pub message: String,
    pub status: TransactionStatus,
    pub reference: TxReference,
    pub payment_request: String,
    pub reference_doctype: String,
    pub reference_name: String,
    pub transaction_id: i64,
    pub data: Value,
}

impl NewLedgerEntry {
    /// Builds the ledger entry for a verification result. This is where the provider's minor-unit amount becomes a
    /// decimal currency amount.
    pub fn from_verification(result: &VerificationResult) -> Self {
        Self {
            amount: result.amount.to_major(),
            currency: result.currency.clone(),
            message: result.message.clone(),
            status: result.status,
            reference: result.reference.clone(),
            payment_request: result.metadata.docname.clone(),
            reference_doctype: result.metadata.reference_doctype.clone(),
            reference_name: result.metadata.reference_name.clone(),
            transaction_id: result.transaction_id,
            data: result.raw.clone(),
        }
    }
}

//--------------------------------------  PaymentRequestType   -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentRequestType {
    /// Money coming in; the only type this server settles.
    Inward,
    /// Money going out.
    Outward,
}

impl Display for PaymentRequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentRequestType::Inward => write!(f, "Inward"),
            PaymentRequestType::Outward => write!(f, "Outward"),
        }
    }
}

impl FromStr for PaymentRequestType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Inward" => Ok(Self::Inward),
            "Outward" => Ok(Self::Outward),
            s => Err(ConversionError(s.to_string())),
        }
    }
}

//--------------------------------------    PaymentRequest     -------------------------------------------------------
/// A payment request document, owned by the external order system. The engine never mutates its fields directly;
/// settlement goes through [`crate::traits::DocumentStore::settle_payment_request`].
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRequest {
    pub name: String,
    pub request_type: PaymentRequestType,
    pub email_to: Option<String>,
    pub currency: String,
    pub status: String,
    /// Name of the gateway-settings document this request pays through.
    pub payment_gateway: String,
    pub reference_doctype: String,
    pub reference_name: String,
}

//--------------------------------------  IntegrationRequest   -------------------------------------------------------
#[derive(Debug, Clone, FromRow)]
pub struct IntegrationRequest {
    pub id: i64,
    pub reference_doctype: String,
    pub reference_docname: String,
    pub status: String,
}

//--------------------------------------      SalesOrder       -------------------------------------------------------
/// The settled order, read-only from the engine's perspective.
#[derive(Debug, Clone)]
pub struct SalesOrder {
    pub name: String,
    pub customer_name: String,
    pub contact_email: Option<String>,
    pub customer_email: Option<String>,
    pub items: Vec<OrderLineItem>,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderLineItem {
    pub item_code: String,
}

//--------------------------------------   ProvisioningEntry   -------------------------------------------------------
/// One row of the course provisioning catalog: which enrollment details unlock a purchasable item.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ProvisioningEntry {
    pub item_code: String,
    pub enrollment_key: Option<String>,
    pub course_link: Option<String>,
}

//--------------------------------------  GatewayCredentials   -------------------------------------------------------
/// Credentials for a configured gateway, resolved by gateway name from the settings store.
#[derive(Debug, Clone)]
pub struct GatewayCredentials {
    pub gateway: String,
    pub secret_key: Secret<String>,
    pub public_key: String,
}

//--------------------------------------   EnrollmentNotice    -------------------------------------------------------
/// A rendered enrollment notification, ready for dispatch. Computed fresh per reconciliation event, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentNotice {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}
