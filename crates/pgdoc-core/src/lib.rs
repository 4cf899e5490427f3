//! Core model and builder for pgdoc.
//!
//! Defines the raw catalog records handed over by the collector, the
//! frozen schema graph, and the builder that links one into the other.
//! This crate performs no I/O; everything here is a pure function of the
//! collected records.

pub mod builder;
pub mod error;
pub mod model;
pub mod raw;
pub mod redaction;

pub use builder::build_graph;
pub use error::{Error, QueryGroup, Result};
pub use model::{
    ColumnId, ColumnNode, ConstraintId, ConstraintKind, ConstraintNode, FkAction, FkTarget,
    IndexId, IndexKey, IndexNode, SchemaGraph, SchemaId, SchemaNode, TableId, TableKind, TableNode,
};
pub use raw::{
    RawCatalog, RawColumn, RawConstraint, RawConstraintKind, RawForeignKey, RawIndex, RawSchema,
    RawTable,
};
pub use redaction::redact_connection_string;
