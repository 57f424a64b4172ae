//! The reconciliation flow: verify a transaction with the provider, record it at most once, settle the originating
//! payment request, and dispatch enrollment details for the purchased items.
use std::fmt::Debug;

use log::*;
use thiserror::Error;

use crate::{
    db_types::{LedgerEntry, NewLedgerEntry, TransactionMetadata, TransactionStatus, TxReference},
    fulfillment,
    traits::{
        DocumentStore,
        DocumentStoreError,
        EnrollmentMailer,
        GatewayClient,
        GatewayError,
        LedgerError,
        ProvisioningCatalog,
        ReconciliationLedger,
    },
};

/// `ReconciliationApi` is the single entry point for confirming a Paystack transaction.
///
/// Both the webhook push and the client-initiated poll converge on [`ReconciliationApi::reconcile`] with the same
/// arguments. The ledger's uniqueness constraint on the transaction reference is the only synchronization point:
/// whichever execution context records the reference first performs settlement and fulfillment, and every other
/// delivery becomes a no-op.
#[derive(Clone)]
pub struct ReconciliationApi<G, B, M> {
    gateway: G,
    db: B,
    mailer: M,
}

impl<G, B, M> Debug for ReconciliationApi<G, B, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<G, B, M> ReconciliationApi<G, B, M> {
    pub fn new(gateway: G, db: B, mailer: M) -> Self {
        Self { gateway, db, mailer }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<G, B, M> ReconciliationApi<G, B, M>
where
    G: GatewayClient,
    B: ReconciliationLedger + DocumentStore + ProvisioningCatalog,
    M: EnrollmentMailer,
{
    /// Verifies and settles the transaction identified by `reference`, resolving credentials from the
    /// gateway-settings document named by `gateway`.
    ///
    /// Effects, in order:
    /// 1. The provider is asked to verify the reference. A gateway failure aborts here — nothing is written.
    /// 2. The result is recorded in the ledger. If the reference was already recorded, this invocation is a pure
    ///    no-op and returns [`ReconciliationOutcome::Duplicate`].
    /// 3. A `pending` transaction is recorded but not settled; settlement rides on the provider's final
    ///    notification for the same reference.
    /// 4. The payment request and its integration request are marked `Completed` together. A missing document here
    ///    is a data-consistency alarm: the money is verified but settlement could not be applied.
    /// 5. For `success` transactions only, enrollment details are matched and dispatched. Fulfillment failures are
    ///    reported in the outcome and never roll settlement back.
    pub async fn reconcile(
        &self,
        reference: &TxReference,
        gateway: &str,
    ) -> Result<ReconciliationOutcome, ReconciliationError> {
        trace!("🔄️💳️ Reconciling transaction [{reference}] via gateway '{gateway}'");
        if reference.as_str().is_empty() {
            return Err(ReconciliationError::EmptyReference);
        }
        let credentials = self
            .db
            .fetch_gateway_credentials(gateway)
            .await?
            .ok_or_else(|| ReconciliationError::UnknownGateway(gateway.to_string()))?;
        let verification = self.gateway.verify(reference, &credentials).await?;
        let (entry, created) = self.db.record_if_absent(NewLedgerEntry::from_verification(&verification)).await?;
        if !created {
            debug!("🔄️💳️ Transaction [{reference}] has already been processed. Nothing to do.");
            return Ok(ReconciliationOutcome::Duplicate(entry));
        }
        info!(
            "🔄️💳️ Transaction [{reference}] recorded with status {}. Amount: {:.2} {}",
            entry.status, entry.amount, entry.currency
        );
        if verification.status == TransactionStatus::Pending {
            info!("🔄️💳️ Transaction [{reference}] is still pending on the provider side. Settlement is deferred.");
            return Ok(ReconciliationOutcome::VerifiedPending(entry));
        }
        self.db.settle_payment_request(&verification.metadata).await?;
        debug!("🔄️💳️ Payment request '{}' settled for [{reference}]", verification.metadata.docname);
        let fulfillment = if verification.status == TransactionStatus::Success {
            self.dispatch_enrollments(reference, &verification.metadata).await
        } else {
            debug!(
                "🔄️💳️ Transaction [{reference}] was verified with status {}. No fulfillment is due.",
                verification.status
            );
            FulfillmentOutcome::Skipped
        };
        Ok(ReconciliationOutcome::Settled { entry, fulfillment })
    }

    /// Matches the settled order against the provisioning catalog and dispatches the enrollment notice.
    ///
    /// Failures in this stage are converted into a [`FulfillmentOutcome`] rather than propagated: settlement has
    /// already been committed and stands regardless of notification delivery.
    async fn dispatch_enrollments(
        &self,
        reference: &TxReference,
        metadata: &TransactionMetadata,
    ) -> FulfillmentOutcome {
        let order =
            match self.db.fetch_sales_order(&metadata.reference_doctype, &metadata.reference_name).await {
                Ok(Some(order)) => order,
                Ok(None) => {
                    warn!(
                        "🔄️📦️ No {} document named '{}' for transaction [{reference}]. Enrollment delivery skipped.",
                        metadata.reference_doctype, metadata.reference_name
                    );
                    return FulfillmentOutcome::Failed(format!(
                        "{} '{}' not found",
                        metadata.reference_doctype, metadata.reference_name
                    ));
                },
                Err(e) => {
                    error!("🔄️📦️ Could not load the order for transaction [{reference}]. {e}");
                    return FulfillmentOutcome::Failed(e.to_string());
                },
            };
        let catalog = match self.db.fetch_provisioning_entries().await {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("🔄️📦️ Could not load the provisioning catalog. {e}");
                return FulfillmentOutcome::Failed(e.to_string());
            },
        };
        let matched = fulfillment::match_enrollments(&order.items, &catalog);
        if matched.is_empty() {
            debug!("🔄️📦️ Order '{}' contains no provisionable items. No notification is sent.", order.name);
            return FulfillmentOutcome::NothingToDeliver;
        }
        let Some(recipient) = fulfillment::resolve_recipient(&order) else {
            warn!(
                "🔄️📦️ No customer email found for order '{}'. {} enrollment(s) could not be delivered.",
                order.name,
                matched.len()
            );
            return FulfillmentOutcome::MissingCustomerEmail;
        };
        let notice = fulfillment::render_notice(&order, recipient, &matched);
        match self.mailer.send_enrollment_notice(&notice).await {
            Ok(()) => {
                info!("🔄️📦️ Enrollment details for {} course(s) sent to {recipient}", matched.len());
                FulfillmentOutcome::Dispatched { recipient: recipient.to_string(), courses: matched.len() }
            },
            Err(e) => {
                warn!("🔄️📦️ Could not send enrollment details to {recipient}. Settlement stands. {e}");
                FulfillmentOutcome::Failed(e.to_string())
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum ReconciliationOutcome {
    /// First delivery: this invocation created the ledger entry and applied settlement.
    Settled { entry: LedgerEntry, fulfillment: FulfillmentOutcome },
    /// The ledger already held this reference. This invocation had no side effects.
    Duplicate(LedgerEntry),
    /// The provider has not reached a verdict yet. The transaction is recorded but the settlement hook was not
    /// invoked. Later deliveries for the same reference are duplicates, so promoting a pending record once the
    /// provider reaches a verdict is left to operator tooling.
    VerifiedPending(LedgerEntry),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    /// The enrollment notice was handed to the mailer.
    Dispatched { recipient: String, courses: usize },
    /// The transaction did not complete successfully; no fulfillment is due.
    Skipped,
    /// None of the order's line items appear in the provisioning catalog. Not an error.
    NothingToDeliver,
    /// Matched items exist but the order carries no usable customer email.
    MissingCustomerEmail,
    /// Delivery failed after settlement; the settlement stands.
    Failed(String),
}

#[derive(Debug, Error)]
pub enum ReconciliationError {
    #[error("The transaction reference must not be empty")]
    EmptyReference,
    #[error("No gateway settings found for '{0}'")]
    UnknownGateway(String),
    #[error("{0}")]
    Gateway(#[from] GatewayError),
    #[error("{0}")]
    Ledger(#[from] LedgerError),
    #[error("The transaction was verified, but the {doctype} document '{name}' is missing. Settlement was not applied.")]
    MissingAssociatedDocument { doctype: String, name: String },
    #[error("{0}")]
    Documents(DocumentStoreError),
}

impl From<DocumentStoreError> for ReconciliationError {
    fn from(e: DocumentStoreError) -> Self {
        match e {
            DocumentStoreError::MissingDocument { doctype, name } => Self::MissingAssociatedDocument { doctype, name },
            other => Self::Documents(other),
        }
    }
}
