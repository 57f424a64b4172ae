use thiserror::Error;

use crate::db_types::ProvisioningEntry;

/// Read-only access to the course provisioning catalog.
#[allow(async_fn_in_trait)]
pub trait ProvisioningCatalog {
    /// One read of every provisioning row. Matching against order line items happens in [`crate::fulfillment`].
    async fn fetch_provisioning_entries(&self) -> Result<Vec<ProvisioningEntry>, CatalogError>;
}

#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Internal catalog database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self {
        CatalogError::DatabaseError(e.to_string())
    }
}
