//! PostgreSQL catalog client.

use async_trait::async_trait;
use sqlx::PgPool;

use pgdoc_core::{RawColumn, RawConstraint, RawIndex, RawSchema, RawTable, Result};

use crate::client::CatalogClient;
use crate::options::CatalogFilter;

mod mapper;
mod queries;

/// Catalog client backed by a PostgreSQL connection pool.
///
/// Issues only read-only queries against `pg_catalog`. The pool is
/// shared, so the collector's query groups can run concurrently over
/// separate pooled connections.
#[derive(Debug, Clone)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogClient for PostgresClient {
    async fn database_name(&self) -> Result<String> {
        queries::fetch_database_name(&self.pool).await
    }

    async fn schemas(&self, filter: &CatalogFilter) -> Result<Vec<RawSchema>> {
        let rows = queries::list_schemas(&self.pool, filter).await?;
        Ok(mapper::map_schemas(rows))
    }

    async fn tables(&self, filter: &CatalogFilter) -> Result<Vec<RawTable>> {
        let rows = queries::list_tables(&self.pool, filter).await?;
        Ok(mapper::map_tables(rows, filter))
    }

    async fn columns(&self, filter: &CatalogFilter) -> Result<Vec<RawColumn>> {
        let rows = queries::list_columns(&self.pool, filter).await?;
        Ok(mapper::map_columns(rows, filter))
    }

    async fn constraints(&self, filter: &CatalogFilter) -> Result<Vec<RawConstraint>> {
        let rows = queries::list_constraints(&self.pool, filter).await?;
        Ok(mapper::map_constraints(rows))
    }

    async fn indexes(&self, filter: &CatalogFilter) -> Result<Vec<RawIndex>> {
        let rows = queries::list_indexes(&self.pool, filter).await?;
        Ok(mapper::map_indexes(rows))
    }
}
