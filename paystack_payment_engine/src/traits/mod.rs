//! # Trait seams of the reconciliation engine
//!
//! This module defines the interface contracts the engine depends on. The engine itself only orchestrates; every
//! outward-facing effect goes through one of these traits:
//!
//! * [`GatewayClient`] issues the single outbound verification call to the payment provider.
//! * [`ReconciliationLedger`] is the durable, uniqueness-enforced store of processed transaction references.
//! * [`DocumentStore`] gives access to the documents owned by the external order system (payment requests,
//!   integration requests, sales orders, gateway credentials) and applies the settlement transition.
//! * [`ProvisioningCatalog`] is the read-only mapping from purchasable item to enrollment delivery details.
//! * [`EnrollmentMailer`] delivers the rendered enrollment notice.
//!
//! [`crate::SqliteDatabase`] implements all of the storage-side traits; the server crate provides the gateway client
//! and the mailer.
mod document_store;
mod gateway;
mod ledger;
mod mailer;
mod provisioning;

pub use document_store::{DocumentStore, DocumentStoreError};
pub use gateway::{GatewayClient, GatewayError};
pub use ledger::{LedgerError, ReconciliationLedger};
pub use mailer::{EnrollmentMailer, MailerError};
pub use provisioning::{CatalogError, ProvisioningCatalog};

/// Marker for backends that provide every storage-side dependency of the reconciliation flow.
pub trait ReconciliationBackend: ReconciliationLedger + DocumentStore + ProvisioningCatalog {}
