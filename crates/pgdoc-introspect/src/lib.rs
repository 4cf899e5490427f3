//! Catalog collection for pgdoc.
//!
//! Fetches raw schema metadata from a live PostgreSQL database and hands
//! it to [`pgdoc_core::build_graph`]. The collector issues its four
//! query groups concurrently and never returns a partial catalog.

pub mod client;
pub mod collector;
pub mod options;
pub mod postgres;

pub use client::CatalogClient;
pub use collector::collect_catalog;
pub use options::{CatalogFilter, CollectOptions};
pub use postgres::PostgresClient;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use pgdoc_core::{Result, SchemaGraph};

/// Collect the catalog over `pool` and build the frozen schema graph.
pub async fn introspect(
    pool: &PgPool,
    opts: &CollectOptions,
    cancel: &CancellationToken,
) -> Result<SchemaGraph> {
    let client = PostgresClient::new(pool.clone());
    let raw = collect_catalog(&client, opts, cancel).await?;
    pgdoc_core::build_graph(raw)
}
