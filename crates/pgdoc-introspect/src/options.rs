use std::time::Duration;

/// Options that control what the collector fetches.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Explicit schema names to include; `None` means every non-system
    /// schema.
    pub schemas: Option<Vec<String>>,
    pub include_system_schemas: bool,
    pub include_views: bool,
    pub include_materialized_views: bool,
    pub include_foreign_tables: bool,
    pub include_comments: bool,
    /// Per-query-group timeout. A group that exceeds it is reported as a
    /// lost connection; no partial catalog is returned.
    pub query_timeout: Duration,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            schemas: None,
            include_system_schemas: false,
            include_views: true,
            include_materialized_views: true,
            include_foreign_tables: true,
            include_comments: true,
            query_timeout: Duration::from_secs(30),
        }
    }
}

/// SQL-side filter compiled from [`CollectOptions`].
///
/// Every query group binds the same filter, which keeps the groups
/// mutually consistent: a table excluded here is excluded from the
/// column, constraint, and index queries too.
#[derive(Debug, Clone)]
pub struct CatalogFilter {
    /// Explicit schema list; empty means "no explicit filter".
    pub schemas: Vec<String>,
    pub include_system_schemas: bool,
    /// relkind codes of the table-like objects to fetch.
    pub relkinds: Vec<String>,
    pub include_comments: bool,
}

impl CatalogFilter {
    pub fn from_options(opts: &CollectOptions) -> Self {
        let mut relkinds = vec!["r".to_string(), "p".to_string()];
        if opts.include_views {
            relkinds.push("v".to_string());
        }
        if opts.include_materialized_views {
            relkinds.push("m".to_string());
        }
        if opts.include_foreign_tables {
            relkinds.push("f".to_string());
        }

        Self {
            schemas: opts.schemas.clone().unwrap_or_default(),
            // An explicit schema list overrides the system-schema
            // exclusion: naming pg_catalog means the caller wants it.
            include_system_schemas: opts.include_system_schemas || opts.schemas.is_some(),
            relkinds,
            include_comments: opts.include_comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_schema_list_overrides_system_exclusion() {
        let opts = CollectOptions {
            schemas: Some(vec!["pg_catalog".to_string()]),
            ..CollectOptions::default()
        };
        let filter = CatalogFilter::from_options(&opts);
        assert!(filter.include_system_schemas);
        assert_eq!(filter.schemas, vec!["pg_catalog"]);
    }

    #[test]
    fn relkinds_follow_include_flags() {
        let opts = CollectOptions {
            include_views: false,
            include_materialized_views: false,
            include_foreign_tables: false,
            ..CollectOptions::default()
        };
        let filter = CatalogFilter::from_options(&opts);
        assert_eq!(filter.relkinds, vec!["r", "p"]);
    }
}
