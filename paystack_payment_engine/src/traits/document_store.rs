use thiserror::Error;

use crate::db_types::{GatewayCredentials, PaymentRequest, SalesOrder, TransactionMetadata};

/// Access to the documents owned by the external order system.
///
/// The engine never mutates document fields directly; the only write it performs is the settlement transition, and
/// that goes through [`DocumentStore::settle_payment_request`] so that backends can make it atomic.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Resolves the credentials for the named gateway-settings document.
    async fn fetch_gateway_credentials(&self, gateway: &str) -> Result<Option<GatewayCredentials>, DocumentStoreError>;

    /// Fetches a payment request by name.
    async fn fetch_payment_request(&self, name: &str) -> Result<Option<PaymentRequest>, DocumentStoreError>;

    /// Fetches the source order named by `(doctype, name)`, including its line items.
    async fn fetch_sales_order(&self, doctype: &str, name: &str) -> Result<Option<SalesOrder>, DocumentStoreError>;

    /// Applies the settlement transition for a verified transaction: marks the payment request named by
    /// `metadata.docname` as authorized with outcome `Completed`, and the matching integration request (keyed by
    /// `metadata.doctype` / `metadata.docname`) as `Completed`.
    ///
    /// Both mutations must be committed together. If either document is missing, the backend returns
    /// [`DocumentStoreError::MissingDocument`] and neither mutation is applied.
    async fn settle_payment_request(&self, metadata: &TransactionMetadata) -> Result<(), DocumentStoreError>;
}

#[derive(Debug, Clone, Error)]
pub enum DocumentStoreError {
    #[error("Internal document database error: {0}")]
    DatabaseError(String),
    #[error("The {doctype} document '{name}' does not exist")]
    MissingDocument { doctype: String, name: String },
}

impl From<sqlx::Error> for DocumentStoreError {
    fn from(e: sqlx::Error) -> Self {
        DocumentStoreError::DatabaseError(e.to_string())
    }
}
