//! Orchestrates the catalog query groups into one raw catalog.
//!
//! The four groups (schemas, tables, columns, constraints+indexes) are
//! independent reads and run concurrently over the shared client; the
//! builder consumes them only after all four complete. On the first
//! failure the remaining group futures are dropped, which aborts their
//! outstanding queries: collection is all-or-nothing.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use pgdoc_core::{Error, QueryGroup, RawCatalog, Result};

use crate::client::CatalogClient;
use crate::options::{CatalogFilter, CollectOptions};

/// Collect the raw catalog from `client` under `opts`.
///
/// Each query group runs under `opts.query_timeout` and the shared
/// cancellation token. A timeout or client failure surfaces as
/// [`Error::ConnectionLost`] naming the group; cancellation surfaces as
/// [`Error::Cancelled`]. No partial catalog is ever returned.
pub async fn collect_catalog<C>(
    client: &C,
    opts: &CollectOptions,
    cancel: &CancellationToken,
) -> Result<RawCatalog>
where
    C: CatalogClient + ?Sized,
{
    let filter = CatalogFilter::from_options(opts);
    let limit = opts.query_timeout;

    let schemas_group = query_group(QueryGroup::Schemas, limit, cancel, async {
        let database = client.database_name().await?;
        let schemas = client.schemas(&filter).await?;
        Ok((database, schemas))
    });
    let tables_group = query_group(QueryGroup::Tables, limit, cancel, client.tables(&filter));
    let columns_group = query_group(QueryGroup::Columns, limit, cancel, client.columns(&filter));
    let relations_group = query_group(QueryGroup::ConstraintsAndIndexes, limit, cancel, async {
        let constraints = client.constraints(&filter).await?;
        let indexes = client.indexes(&filter).await?;
        Ok((constraints, indexes))
    });

    let ((database, schemas), tables, columns, (constraints, indexes)) =
        tokio::try_join!(schemas_group, tables_group, columns_group, relations_group)?;

    tracing::debug!(
        schemas = schemas.len(),
        tables = tables.len(),
        columns = columns.len(),
        constraints = constraints.len(),
        indexes = indexes.len(),
        "catalog collected"
    );

    Ok(RawCatalog {
        database,
        schemas,
        tables,
        columns,
        constraints,
        indexes,
    })
}

async fn query_group<T>(
    group: QueryGroup,
    limit: Duration,
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    tokio::select! {
        _ = cancel.cancelled() => Err(Error::Cancelled),
        outcome = tokio::time::timeout(limit, fut) => match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(Error::Catalog(message))) => Err(Error::ConnectionLost { group, message }),
            Ok(Err(other)) => Err(other),
            Err(_) => Err(Error::ConnectionLost {
                group,
                message: format!("query group timed out after {:?}", limit),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use pgdoc_core::{RawColumn, RawConstraint, RawIndex, RawSchema, RawTable};

    /// Canned client that fails at a chosen entity family, simulating a
    /// connection dropping partway through collection.
    struct FlakyClient {
        fail_at_columns: bool,
        hang_at_columns: bool,
    }

    impl FlakyClient {
        fn healthy() -> Self {
            Self {
                fail_at_columns: false,
                hang_at_columns: false,
            }
        }
    }

    #[async_trait]
    impl CatalogClient for FlakyClient {
        async fn database_name(&self) -> pgdoc_core::Result<String> {
            Ok("testdb".to_string())
        }

        async fn schemas(&self, _filter: &CatalogFilter) -> pgdoc_core::Result<Vec<RawSchema>> {
            Ok(vec![RawSchema {
                oid: 1,
                name: "public".to_string(),
                owner: "postgres".to_string(),
            }])
        }

        async fn tables(&self, _filter: &CatalogFilter) -> pgdoc_core::Result<Vec<RawTable>> {
            Ok(vec![RawTable {
                oid: 10,
                schema_oid: 1,
                name: "users".to_string(),
                kind: pgdoc_core::TableKind::Table,
                comment: None,
            }])
        }

        async fn columns(&self, _filter: &CatalogFilter) -> pgdoc_core::Result<Vec<RawColumn>> {
            if self.hang_at_columns {
                std::future::pending::<()>().await;
            }
            if self.fail_at_columns {
                return Err(Error::Catalog("server closed the connection".to_string()));
            }
            Ok(vec![RawColumn {
                table_oid: 10,
                ordinal: 1,
                name: "id".to_string(),
                data_type: "bigint".to_string(),
                is_nullable: false,
                default: None,
                comment: None,
            }])
        }

        async fn constraints(
            &self,
            _filter: &CatalogFilter,
        ) -> pgdoc_core::Result<Vec<RawConstraint>> {
            Ok(Vec::new())
        }

        async fn indexes(&self, _filter: &CatalogFilter) -> pgdoc_core::Result<Vec<RawIndex>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn collects_all_four_groups() {
        let client = FlakyClient::healthy();
        let cancel = CancellationToken::new();
        let catalog = collect_catalog(&client, &CollectOptions::default(), &cancel)
            .await
            .unwrap();

        assert_eq!(catalog.database, "testdb");
        assert_eq!(catalog.schemas.len(), 1);
        assert_eq!(catalog.tables.len(), 1);
        assert_eq!(catalog.columns.len(), 1);
    }

    #[tokio::test]
    async fn drop_mid_collection_is_all_or_nothing() {
        // Schemas and tables succeed; columns fails. The whole
        // collection must fail, naming the columns group.
        let client = FlakyClient {
            fail_at_columns: true,
            hang_at_columns: false,
        };
        let cancel = CancellationToken::new();
        let err = collect_catalog(&client, &CollectOptions::default(), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::ConnectionLost {
                group: QueryGroup::Columns,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn timeout_reports_connection_lost_for_the_group() {
        let client = FlakyClient {
            fail_at_columns: false,
            hang_at_columns: true,
        };
        let cancel = CancellationToken::new();
        let opts = CollectOptions {
            query_timeout: Duration::from_millis(20),
            ..CollectOptions::default()
        };
        let err = collect_catalog(&client, &opts, &cancel).await.unwrap_err();

        assert!(matches!(
            err,
            Error::ConnectionLost {
                group: QueryGroup::Columns,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn cancellation_aborts_collection() {
        let client = FlakyClient {
            fail_at_columns: false,
            hang_at_columns: true,
        };
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = collect_catalog(&client, &CollectOptions::default(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
