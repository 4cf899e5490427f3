//! Raw catalog records produced at the collector boundary.
//!
//! These are statically shaped but unresolved: cross-references are
//! catalog oids, and nothing is linked until [`crate::build_graph`]
//! runs.

use serde::{Deserialize, Serialize};

use crate::model::{FkAction, TableKind};

/// A namespace row from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSchema {
    pub oid: i64,
    pub name: String,
    pub owner: String,
}

/// A table-like object row from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTable {
    pub oid: i64,
    pub schema_oid: i64,
    pub name: String,
    pub kind: TableKind,
    pub comment: Option<String>,
}

/// A column row from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawColumn {
    pub table_oid: i64,
    /// Catalog-assigned position of the column within its table.
    pub ordinal: i16,
    pub name: String,
    /// Catalog-formatted type, e.g. `character varying(255)`.
    pub data_type: String,
    pub is_nullable: bool,
    pub default: Option<String>,
    pub comment: Option<String>,
}

/// Kind tag for a raw constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    Check,
}

/// Reference side of a foreign-key constraint row.
///
/// The target is identified both by oid (used for resolution) and by the
/// catalog-supplied qualified name (kept for display when the target is
/// outside the collected set).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawForeignKey {
    pub referenced_table_oid: i64,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
    pub on_update: FkAction,
    pub on_delete: FkAction,
}

/// A constraint row from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawConstraint {
    pub table_oid: i64,
    pub name: String,
    pub kind: RawConstraintKind,
    /// Constrained columns of the owning table, in key order.
    pub columns: Vec<String>,
    /// Catalog-rendered definition; set for check constraints.
    pub definition: Option<String>,
    /// Set when `kind` is [`RawConstraintKind::ForeignKey`].
    pub foreign_key: Option<RawForeignKey>,
}

/// An index row from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIndex {
    pub table_oid: i64,
    pub name: String,
    /// Key columns in index order; `None` marks an expression key.
    pub columns: Vec<Option<String>>,
    pub is_unique: bool,
    pub is_primary: bool,
    /// Access method name, e.g. `btree`.
    pub method: String,
}

/// The join-point product of the four collector query groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCatalog {
    pub database: String,
    pub schemas: Vec<RawSchema>,
    pub tables: Vec<RawTable>,
    pub columns: Vec<RawColumn>,
    pub constraints: Vec<RawConstraint>,
    pub indexes: Vec<RawIndex>,
}
