use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{LedgerEntry, NewLedgerEntry, TxReference},
    traits::LedgerError,
};

/// Inserts the entry unless the reference has already been recorded, returning `false` in the second parameter for a
/// duplicate.
///
/// The check and the insert are a single statement: `ON CONFLICT (reference) DO NOTHING` rides on the table's UNIQUE
/// constraint, so two writers racing on the same reference cannot both observe "absent" — exactly one of them gets a
/// row back from `RETURNING`.
pub async fn idempotent_insert(
    entry: NewLedgerEntry,
    conn: &mut SqliteConnection,
) -> Result<(LedgerEntry, bool), LedgerError> {
    let reference = entry.reference.clone();
    let inserted: Option<LedgerEntry> = sqlx::query_as(
        r#"
            INSERT INTO paystack_ledger (
                amount,
                currency,
                message,
                status,
                reference,
                payment_request,
                reference_doctype,
                reference_name,
                transaction_id,
                data
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (reference) DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(entry.amount)
    .bind(entry.currency)
    .bind(entry.message)
    .bind(entry.status)
    .bind(entry.reference)
    .bind(entry.payment_request)
    .bind(entry.reference_doctype)
    .bind(entry.reference_name)
    .bind(entry.transaction_id)
    .bind(sqlx::types::Json(entry.data))
    .fetch_optional(&mut *conn)
    .await?;
    match inserted {
        Some(entry) => {
            debug!("📝️ Ledger entry [{}] recorded with id {}", entry.reference, entry.id);
            Ok((entry, true))
        },
        None => {
            let existing = fetch_entry_by_reference(&reference, conn).await?.ok_or_else(|| {
                LedgerError::DatabaseError(format!("Ledger entry [{reference}] vanished between insert and read-back"))
            })?;
            Ok((existing, false))
        },
    }
}

/// Returns the ledger entry for the given `reference`, if any.
pub async fn fetch_entry_by_reference(
    reference: &TxReference,
    conn: &mut SqliteConnection,
) -> Result<Option<LedgerEntry>, sqlx::Error> {
    let entry = sqlx::query_as("SELECT * FROM paystack_ledger WHERE reference = $1")
        .bind(reference.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(entry)
}
