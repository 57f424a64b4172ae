use thiserror::Error;

use crate::db_types::{LedgerEntry, NewLedgerEntry, TxReference};

/// The durable record of processed transactions, keyed by provider reference.
#[allow(async_fn_in_trait)]
pub trait ReconciliationLedger {
    /// Stores `entry` unless an entry with the same reference already exists.
    ///
    /// Returns the stored (or pre-existing) entry, and `true` if and only if this call created it. The check and the
    /// insert must be atomic with respect to the reference key: when two callers race on the same reference, exactly
    /// one of them may observe `true`. A duplicate is not an error.
    async fn record_if_absent(&self, entry: NewLedgerEntry) -> Result<(LedgerEntry, bool), LedgerError>;

    /// Fetches the ledger entry for the given reference, if one exists.
    async fn fetch_entry_by_reference(&self, reference: &TxReference) -> Result<Option<LedgerEntry>, LedgerError>;
}

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Internal ledger database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}
