//! Per-object report sections.
//!
//! Sections render from the frozen graph only; nothing here performs
//! I/O or mutates state, so re-rendering any section yields identical
//! lines. [`render_lines`] chains every section lazily in the report's
//! deterministic order: schemas lexicographic, tables lexicographic
//! within their schema, columns ordinal.

use unicode_width::UnicodeWidthStr;

use pgdoc_core::{
    ColumnId, ConstraintId, ConstraintKind, FkAction, FkTarget, IndexId, IndexKey, SchemaGraph,
    SchemaId, TableId,
};

use crate::config::RenderConfig;
use crate::grid::Grid;

/// All report body sections, in order, as one lazy line sequence.
pub fn render_lines<'a>(
    graph: &'a SchemaGraph,
    config: &'a RenderConfig,
) -> impl Iterator<Item = String> + 'a {
    graph.schemas().flat_map(move |(schema_id, schema)| {
        schema_section(graph, schema_id, config).into_iter().chain(
            schema
                .tables()
                .iter()
                .flat_map(move |&table_id| table_section(graph, table_id, config)),
        )
    })
}

/// Heading lines for one schema.
pub fn schema_section(graph: &SchemaGraph, id: SchemaId, _config: &RenderConfig) -> Vec<String> {
    let schema = graph.schema(id);
    let title = format!("Schema: {} (owner: {})", schema.name, schema.owner);
    let underline = "=".repeat(UnicodeWidthStr::width(title.as_str()));

    let mut lines = vec![title, underline, String::new()];
    if schema.tables().is_empty() {
        lines.push("  (no tables)".to_string());
        lines.push(String::new());
    }
    lines
}

/// Full section for one table: heading, column grid, constraints, and
/// indexes as configured.
pub fn table_section(graph: &SchemaGraph, id: TableId, config: &RenderConfig) -> Vec<String> {
    let table = graph.table(id);
    let schema = graph.schema(table.schema);

    let title = format!("Table: {}.{} ({})", schema.name, table.name, table.kind.label());
    let mut lines = vec![
        title.clone(),
        "-".repeat(UnicodeWidthStr::width(title.as_str())),
    ];
    if let Some(comment) = &table.comment {
        lines.push(comment.clone());
    }
    lines.push(String::new());

    if table.columns().is_empty() {
        lines.push("  (no columns)".to_string());
    } else {
        let with_comments = table
            .columns()
            .iter()
            .any(|&column_id| graph.column(column_id).comment.is_some());
        let header: &[&str] = if with_comments {
            &["Column", "Type", "Nullable", "Default", "Comment"]
        } else {
            &["Column", "Type", "Nullable", "Default"]
        };

        let mut grid = Grid::new(header);
        for &column_id in table.columns() {
            let column = graph.column(column_id);
            let mut row = vec![
                column.name.clone(),
                column.data_type.clone(),
                if column.is_nullable {
                    String::new()
                } else {
                    "not null".to_string()
                },
                column.default.clone().unwrap_or_default(),
            ];
            if with_comments {
                row.push(column.comment.clone().unwrap_or_default());
            }
            grid.push_row(row);
        }
        lines.extend(grid.render(config.column_widths));
    }
    lines.push(String::new());

    if config.include_constraints && !table.constraints().is_empty() {
        lines.push("Constraints:".to_string());
        for &constraint_id in table.constraints() {
            lines.push(format!("  {}", constraint_line(graph, constraint_id)));
        }
        lines.push(String::new());
    }

    if config.include_indexes && !table.indexes().is_empty() {
        lines.push("Indexes:".to_string());
        for &index_id in table.indexes() {
            lines.push(format!("  {}", index_line(graph, index_id)));
        }
        lines.push(String::new());
    }

    lines
}

fn column_names(graph: &SchemaGraph, ids: &[ColumnId]) -> String {
    ids.iter()
        .map(|&id| graph.column(id).name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn constraint_line(graph: &SchemaGraph, id: ConstraintId) -> String {
    let constraint = graph.constraint(id);
    let own = column_names(graph, constraint.columns());

    match &constraint.kind {
        ConstraintKind::PrimaryKey => format!("{}: primary key ({own})", constraint.name),
        ConstraintKind::Unique => format!("{}: unique ({own})", constraint.name),
        // pg_get_constraintdef output already reads `CHECK (...)`.
        ConstraintKind::Check { definition } => format!("{}: {definition}", constraint.name),
        ConstraintKind::ForeignKey {
            on_update,
            on_delete,
            target,
        } => {
            let mut actions = String::new();
            if *on_update != FkAction::NoAction {
                actions.push_str(&format!(" on update {}", on_update.label()));
            }
            if *on_delete != FkAction::NoAction {
                actions.push_str(&format!(" on delete {}", on_delete.label()));
            }

            match target {
                FkTarget::Resolved { table, columns } => {
                    let target_table = graph.table(*table);
                    let target_schema = graph.schema(target_table.schema);
                    format!(
                        "{}: foreign key ({own}) -> {}.{} ({}){actions}",
                        constraint.name,
                        target_schema.name,
                        target_table.name,
                        column_names(graph, columns),
                    )
                }
                FkTarget::Unresolved {
                    schema,
                    table,
                    columns,
                } => format!(
                    "{}: foreign key ({own}) -> {}.{} ({}){actions} [unresolved]",
                    constraint.name,
                    schema,
                    table,
                    columns.join(", "),
                ),
            }
        }
    }
}

fn index_line(graph: &SchemaGraph, id: IndexId) -> String {
    let index = graph.index(id);
    let keys = index
        .keys()
        .iter()
        .map(|key| match key {
            IndexKey::Column(column_id) => graph.column(*column_id).name.clone(),
            IndexKey::Expression => "(expression)".to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    let unique = if index.is_unique { "unique " } else { "" };
    let primary = if index.is_primary { " [primary key]" } else { "" };
    format!(
        "{}: {unique}{} ({keys}){primary}",
        index.name, index.method
    )
}
