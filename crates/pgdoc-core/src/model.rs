//! The frozen schema graph.
//!
//! Entities live in arena vectors owned by [`SchemaGraph`] and refer to
//! each other through typed indices, so the graph has no ownership
//! cycles and is trivially shareable across concurrent readers. The
//! arenas are private; after [`crate::build_graph`] returns, nothing can
//! mutate the graph.

use serde::{Deserialize, Serialize};

/// Index of a schema in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SchemaId(pub(crate) u32);

/// Index of a table in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TableId(pub(crate) u32);

/// Index of a column in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ColumnId(pub(crate) u32);

/// Index of a constraint in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConstraintId(pub(crate) u32);

/// Index of an index entity in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct IndexId(pub(crate) u32);

/// Kind of table-like object represented in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Table,
    PartitionedTable,
    View,
    MaterializedView,
    ForeignTable,
}

impl TableKind {
    pub fn label(&self) -> &'static str {
        match self {
            TableKind::Table => "table",
            TableKind::PartitionedTable => "partitioned table",
            TableKind::View => "view",
            TableKind::MaterializedView => "materialized view",
            TableKind::ForeignTable => "foreign table",
        }
    }
}

/// Foreign key action semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FkAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
    Unknown,
}

impl FkAction {
    pub fn label(&self) -> &'static str {
        match self {
            FkAction::NoAction => "no action",
            FkAction::Restrict => "restrict",
            FkAction::Cascade => "cascade",
            FkAction::SetNull => "set null",
            FkAction::SetDefault => "set default",
            FkAction::Unknown => "unknown",
        }
    }
}

/// A namespace and the tables it contains, sorted by name.
#[derive(Debug, Serialize)]
pub struct SchemaNode {
    pub name: String,
    pub owner: String,
    pub(crate) tables: Vec<TableId>,
}

impl SchemaNode {
    /// Contained tables in lexicographic name order.
    pub fn tables(&self) -> &[TableId] {
        &self.tables
    }
}

/// A table-like object with its columns, constraints, and indexes.
#[derive(Debug, Serialize)]
pub struct TableNode {
    pub name: String,
    pub kind: TableKind,
    pub schema: SchemaId,
    pub comment: Option<String>,
    pub(crate) columns: Vec<ColumnId>,
    pub(crate) constraints: Vec<ConstraintId>,
    pub(crate) indexes: Vec<IndexId>,
}

impl TableNode {
    /// Columns in catalog ordinal order.
    pub fn columns(&self) -> &[ColumnId] {
        &self.columns
    }

    /// Constraints sorted by kind rank, then name.
    pub fn constraints(&self) -> &[ConstraintId] {
        &self.constraints
    }

    /// Indexes sorted by name.
    pub fn indexes(&self) -> &[IndexId] {
        &self.indexes
    }
}

/// Column metadata.
#[derive(Debug, Serialize)]
pub struct ColumnNode {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default: Option<String>,
    pub ordinal: i16,
    pub comment: Option<String>,
}

/// Resolution state of a foreign key's target.
#[derive(Debug, Serialize)]
pub enum FkTarget {
    /// The target exists in the collected model.
    Resolved {
        table: TableId,
        columns: Vec<ColumnId>,
    },
    /// The target lies outside the collected set (e.g. filtered out).
    /// The constraint is retained so the report never understates
    /// schema structure; display names come from the catalog.
    Unresolved {
        schema: String,
        table: String,
        columns: Vec<String>,
    },
}

impl FkTarget {
    pub fn is_resolved(&self) -> bool {
        matches!(self, FkTarget::Resolved { .. })
    }
}

/// Kind-specific payload of a constraint.
#[derive(Debug, Serialize)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    Check {
        /// Catalog-rendered definition, e.g. `CHECK ((age > 0))`.
        definition: String,
    },
    ForeignKey {
        on_update: FkAction,
        on_delete: FkAction,
        target: FkTarget,
    },
}

impl ConstraintKind {
    /// Sort rank: primary key, unique, check, foreign key.
    pub fn rank(&self) -> u8 {
        match self {
            ConstraintKind::PrimaryKey => 0,
            ConstraintKind::Unique => 1,
            ConstraintKind::Check { .. } => 2,
            ConstraintKind::ForeignKey { .. } => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "primary key",
            ConstraintKind::Unique => "unique",
            ConstraintKind::Check { .. } => "check",
            ConstraintKind::ForeignKey { .. } => "foreign key",
        }
    }
}

/// A table constraint with its constrained columns resolved.
#[derive(Debug, Serialize)]
pub struct ConstraintNode {
    pub name: String,
    pub table: TableId,
    pub kind: ConstraintKind,
    pub(crate) columns: Vec<ColumnId>,
}

impl ConstraintNode {
    /// Constrained columns of the owning table, in key order.
    pub fn columns(&self) -> &[ColumnId] {
        &self.columns
    }
}

/// A single key of an index.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum IndexKey {
    Column(ColumnId),
    /// An expression key; the catalog assigns it no column.
    Expression,
}

/// An index with its covered keys resolved. Index names are scoped to
/// the owning table in this model, never globally deduplicated.
#[derive(Debug, Serialize)]
pub struct IndexNode {
    pub name: String,
    pub table: TableId,
    pub is_unique: bool,
    pub is_primary: bool,
    pub method: String,
    pub(crate) keys: Vec<IndexKey>,
}

impl IndexNode {
    /// Covered keys in index order.
    pub fn keys(&self) -> &[IndexKey] {
        &self.keys
    }
}

/// The frozen schema graph.
///
/// Built once by [`crate::build_graph`], then read-only: every accessor
/// takes `&self` and no mutating method exists, so the graph can be read
/// concurrently by any number of renderers without locking.
#[derive(Debug, Serialize)]
pub struct SchemaGraph {
    pub(crate) database: String,
    pub(crate) schemas: Vec<SchemaNode>,
    pub(crate) tables: Vec<TableNode>,
    pub(crate) columns: Vec<ColumnNode>,
    pub(crate) constraints: Vec<ConstraintNode>,
    pub(crate) indexes: Vec<IndexNode>,
}

impl SchemaGraph {
    /// Name of the database the catalog was collected from.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Schemas in lexicographic name order.
    pub fn schemas(&self) -> impl Iterator<Item = (SchemaId, &SchemaNode)> {
        self.schemas
            .iter()
            .enumerate()
            .map(|(idx, node)| (SchemaId(idx as u32), node))
    }

    pub fn schema(&self, id: SchemaId) -> &SchemaNode {
        &self.schemas[id.0 as usize]
    }

    pub fn table(&self, id: TableId) -> &TableNode {
        &self.tables[id.0 as usize]
    }

    pub fn column(&self, id: ColumnId) -> &ColumnNode {
        &self.columns[id.0 as usize]
    }

    pub fn constraint(&self, id: ConstraintId) -> &ConstraintNode {
        &self.constraints[id.0 as usize]
    }

    pub fn index(&self, id: IndexId) -> &IndexNode {
        &self.indexes[id.0 as usize]
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Foreign keys whose target lies outside the collected model.
    pub fn unresolved_foreign_keys(&self) -> impl Iterator<Item = (ConstraintId, &ConstraintNode)> {
        self.constraints
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                matches!(
                    &node.kind,
                    ConstraintKind::ForeignKey { target, .. } if !target.is_resolved()
                )
            })
            .map(|(idx, node)| (ConstraintId(idx as u32), node))
    }
}
