//! `SqliteDatabase` is the concrete SQLite backend for the payment engine.
//!
//! It implements all the storage-side traits defined in the [`crate::traits`] module. Besides the trait surface it
//! exposes an ingestion surface (`insert_*` / `upsert_*`) through which the surrounding order system populates the
//! documents the engine reads.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{catalog, create_schema, documents, ledger, new_pool};
use crate::{
    db_types::{
        GatewayCredentials,
        LedgerEntry,
        NewLedgerEntry,
        PaymentRequest,
        ProvisioningEntry,
        SalesOrder,
        TransactionMetadata,
        TxReference,
        INTEGRATION_REQUEST_DOCTYPE,
        SALES_ORDER_DOCTYPE,
    },
    traits::{
        CatalogError,
        DocumentStore,
        DocumentStoreError,
        LedgerError,
        ProvisioningCatalog,
        ReconciliationBackend,
        ReconciliationLedger,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database at `url` and creates the schema if it does not exist yet.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        create_schema(&pool).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    //----------------------------------  Document ingestion surface  ---------------------------------------------

    pub async fn upsert_gateway_settings(&self, credentials: &GatewayCredentials) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.acquire().await?;
        documents::upsert_gateway_settings(credentials, &mut conn).await?;
        debug!("🗃️ Gateway settings for '{}' stored", credentials.gateway);
        Ok(())
    }

    pub async fn insert_payment_request(&self, request: &PaymentRequest) -> Result<(), DocumentStoreError> {
        let mut conn = self.pool.acquire().await?;
        documents::insert_payment_request(request, &mut conn).await?;
        debug!("🗃️ Payment request '{}' stored", request.name);
        Ok(())
    }

    pub async fn insert_integration_request(
        &self,
        reference_doctype: &str,
        reference_docname: &str,
        status: &str,
    ) -> Result<i64, DocumentStoreError> {
        let mut conn = self.pool.acquire().await?;
        let id = documents::insert_integration_request(reference_doctype, reference_docname, status, &mut conn).await?;
        debug!("🗃️ Integration request {id} stored for {reference_doctype} '{reference_docname}'");
        Ok(id)
    }

    pub async fn insert_sales_order(&self, order: &SalesOrder) -> Result<(), DocumentStoreError> {
        let mut tx = self.pool.begin().await?;
        documents::insert_sales_order(order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Sales order '{}' stored with {} line item(s)", order.name, order.items.len());
        Ok(())
    }

    pub async fn upsert_provisioning_entry(&self, entry: &ProvisioningEntry) -> Result<(), CatalogError> {
        let mut conn = self.pool.acquire().await?;
        catalog::upsert_provisioning_entry(entry, &mut conn).await?;
        Ok(())
    }
}

impl ReconciliationLedger for SqliteDatabase {
    async fn record_if_absent(&self, entry: NewLedgerEntry) -> Result<(LedgerEntry, bool), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        ledger::idempotent_insert(entry, &mut conn).await
    }

    async fn fetch_entry_by_reference(&self, reference: &TxReference) -> Result<Option<LedgerEntry>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(ledger::fetch_entry_by_reference(reference, &mut conn).await?)
    }
}

impl DocumentStore for SqliteDatabase {
    async fn fetch_gateway_credentials(&self, gateway: &str) -> Result<Option<GatewayCredentials>, DocumentStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(documents::fetch_gateway_credentials(gateway, &mut conn).await?)
    }

    async fn fetch_payment_request(&self, name: &str) -> Result<Option<PaymentRequest>, DocumentStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(documents::fetch_payment_request(name, &mut conn).await?)
    }

    async fn fetch_sales_order(&self, doctype: &str, name: &str) -> Result<Option<SalesOrder>, DocumentStoreError> {
        if doctype != SALES_ORDER_DOCTYPE {
            warn!("🗃️ Unsupported order doctype '{doctype}' requested for '{name}'");
            return Ok(None);
        }
        let mut conn = self.pool.acquire().await?;
        Ok(documents::fetch_sales_order(name, &mut conn).await?)
    }

    /// Marks the payment request and its integration request as completed in a single transaction. If either
    /// document is missing, nothing is changed.
    async fn settle_payment_request(&self, metadata: &TransactionMetadata) -> Result<(), DocumentStoreError> {
        let mut tx = self.pool.begin().await?;
        let request = documents::fetch_payment_request(&metadata.docname, &mut tx).await?.ok_or_else(|| {
            DocumentStoreError::MissingDocument { doctype: metadata.doctype.clone(), name: metadata.docname.clone() }
        })?;
        let integration =
            documents::fetch_integration_request(&metadata.doctype, &metadata.docname, &mut tx).await?.ok_or_else(
                || DocumentStoreError::MissingDocument {
                    doctype: INTEGRATION_REQUEST_DOCTYPE.to_string(),
                    name: metadata.docname.clone(),
                },
            )?;
        documents::mark_payment_request_completed(&request.name, &mut tx).await?;
        documents::mark_integration_request_completed(integration.id, &mut tx).await?;
        tx.commit().await?;
        debug!(
            "🗃️ Payment request '{}' and integration request {} marked as {}",
            request.name,
            integration.id,
            documents::SETTLED_STATUS
        );
        Ok(())
    }
}

impl ProvisioningCatalog for SqliteDatabase {
    async fn fetch_provisioning_entries(&self) -> Result<Vec<ProvisioningEntry>, CatalogError> {
        let mut conn = self.pool.acquire().await?;
        Ok(catalog::fetch_provisioning_entries(&mut conn).await?)
    }
}

impl ReconciliationBackend for SqliteDatabase {}
