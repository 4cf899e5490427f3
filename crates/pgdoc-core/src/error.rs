use std::fmt;

use thiserror::Error;

/// The collector query group in which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryGroup {
    Schemas,
    Tables,
    Columns,
    ConstraintsAndIndexes,
}

impl fmt::Display for QueryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QueryGroup::Schemas => "schemas",
            QueryGroup::Tables => "tables",
            QueryGroup::Columns => "columns",
            QueryGroup::ConstraintsAndIndexes => "constraints and indexes",
        };
        f.write_str(label)
    }
}

/// Error type shared across the pgdoc crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The catalog connection dropped or timed out during collection.
    #[error("connection lost while fetching {group}: {message}")]
    ConnectionLost { group: QueryGroup, message: String },
    /// Raw catalog query failure, before the collector attributes it to
    /// a query group.
    #[error("catalog query failed: {0}")]
    Catalog(String),
    /// A table references a schema absent from the collected set.
    #[error("table {table} references unknown schema oid {schema_oid}")]
    OrphanTable { table: String, schema_oid: i64 },
    /// A column references a table absent from the collected set.
    #[error("column {column} references unknown table oid {table_oid}")]
    OrphanColumn { column: String, table_oid: i64 },
    /// A constraint references a table absent from the collected set.
    #[error("constraint {constraint} references unknown table oid {table_oid}")]
    OrphanConstraint { constraint: String, table_oid: i64 },
    /// An index references a table absent from the collected set.
    #[error("index {index} references unknown table oid {table_oid}")]
    OrphanIndex { index: String, table_oid: i64 },
    /// A constraint names a column that its own table does not have.
    #[error("constraint {constraint} on {table} names unknown column {column}")]
    UnknownConstraintColumn {
        constraint: String,
        table: String,
        column: String,
    },
    /// An index names a column that its own table does not have.
    #[error("index {index} on {table} names unknown column {column}")]
    UnknownIndexColumn {
        index: String,
        table: String,
        column: String,
    },
    /// Pipeline cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,
}

/// Convenience alias for results returned by the pgdoc crates.
pub type Result<T> = std::result::Result<T, Error>;
