use async_trait::async_trait;

use pgdoc_core::{RawColumn, RawConstraint, RawIndex, RawSchema, RawTable, Result};

use crate::options::CatalogFilter;

/// Read-only access to a database catalog.
///
/// The collector drives this trait, one call per entity family, and
/// joins the results into a [`pgdoc_core::RawCatalog`]. The PostgreSQL
/// implementation lives in [`crate::postgres`]; tests implement it with
/// canned data to simulate failures mid-collection.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Name of the connected database.
    async fn database_name(&self) -> Result<String>;

    async fn schemas(&self, filter: &CatalogFilter) -> Result<Vec<RawSchema>>;

    async fn tables(&self, filter: &CatalogFilter) -> Result<Vec<RawTable>>;

    async fn columns(&self, filter: &CatalogFilter) -> Result<Vec<RawColumn>>;

    async fn constraints(&self, filter: &CatalogFilter) -> Result<Vec<RawConstraint>>;

    async fn indexes(&self, filter: &CatalogFilter) -> Result<Vec<RawIndex>>;
}
