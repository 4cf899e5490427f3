//! Rendering and report assembly for pgdoc.
//!
//! Walks a frozen [`pgdoc_core::SchemaGraph`] in deterministic order and
//! produces a fixed-width text document: one section per schema, one
//! subsection per table, plus a generated table of contents. Output is a
//! finite, restartable sequence of lines; the caller owns the stream it
//! is written to.

pub mod config;
pub mod document;
pub mod grid;
pub mod section;

pub use config::{ColumnWidths, RenderConfig};
pub use document::{Report, TocEntry};
pub use section::{render_lines, schema_section, table_section};
