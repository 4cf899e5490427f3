//! Conversion of catalog rows into the statically-shaped raw records
//! consumed by the builder.

use pgdoc_core::{
    FkAction, RawColumn, RawConstraint, RawConstraintKind, RawForeignKey, RawIndex, RawSchema,
    RawTable, TableKind,
};

use crate::options::CatalogFilter;

use super::queries::{ColumnRow, ConstraintRow, IndexRow, SchemaRow, TableRow};

pub(crate) fn map_schemas(rows: Vec<SchemaRow>) -> Vec<RawSchema> {
    rows.into_iter()
        .map(|row| RawSchema {
            oid: row.oid,
            name: row.name,
            owner: row.owner,
        })
        .collect()
}

pub(crate) fn map_tables(rows: Vec<TableRow>, filter: &CatalogFilter) -> Vec<RawTable> {
    rows.into_iter()
        .map(|row| RawTable {
            oid: row.oid,
            schema_oid: row.schema_oid,
            kind: relkind_to_table_kind(&row.relkind),
            name: row.name,
            comment: if filter.include_comments {
                row.comment
            } else {
                None
            },
        })
        .collect()
}

pub(crate) fn map_columns(rows: Vec<ColumnRow>, filter: &CatalogFilter) -> Vec<RawColumn> {
    rows.into_iter()
        .map(|row| RawColumn {
            table_oid: row.table_oid,
            ordinal: row.ordinal,
            name: row.name,
            data_type: row.data_type,
            is_nullable: row.is_nullable,
            default: row.default_expr,
            comment: if filter.include_comments {
                row.comment
            } else {
                None
            },
        })
        .collect()
}

pub(crate) fn map_constraints(rows: Vec<ConstraintRow>) -> Vec<RawConstraint> {
    rows.into_iter()
        .map(|row| {
            let kind = contype_to_kind(&row.contype);
            let foreign_key = if kind == RawConstraintKind::ForeignKey {
                row.referenced_table_oid.map(|oid| RawForeignKey {
                    referenced_table_oid: oid,
                    referenced_schema: row.referenced_schema.unwrap_or_default(),
                    referenced_table: row.referenced_table.unwrap_or_default(),
                    referenced_columns: row.referenced_columns,
                    on_update: fk_action_from_code(row.on_update.as_deref()),
                    on_delete: fk_action_from_code(row.on_delete.as_deref()),
                })
            } else {
                None
            };

            RawConstraint {
                table_oid: row.table_oid,
                name: row.name,
                kind,
                columns: row.columns,
                definition: row.definition,
                foreign_key,
            }
        })
        .collect()
}

pub(crate) fn map_indexes(rows: Vec<IndexRow>) -> Vec<RawIndex> {
    rows.into_iter()
        .map(|row| RawIndex {
            table_oid: row.table_oid,
            name: row.name,
            // The key query emits an empty string for expression keys
            // (attnum 0 resolves to no attribute).
            columns: row
                .columns
                .into_iter()
                .map(|name| if name.is_empty() { None } else { Some(name) })
                .collect(),
            is_unique: row.is_unique,
            is_primary: row.is_primary,
            method: row.method,
        })
        .collect()
}

fn relkind_to_table_kind(relkind: &str) -> TableKind {
    match relkind {
        "p" => TableKind::PartitionedTable,
        "v" => TableKind::View,
        "m" => TableKind::MaterializedView,
        "f" => TableKind::ForeignTable,
        _ => TableKind::Table,
    }
}

fn contype_to_kind(contype: &str) -> RawConstraintKind {
    match contype {
        "p" => RawConstraintKind::PrimaryKey,
        "u" => RawConstraintKind::Unique,
        "f" => RawConstraintKind::ForeignKey,
        _ => RawConstraintKind::Check,
    }
}

fn fk_action_from_code(code: Option<&str>) -> FkAction {
    match code {
        Some("a") => FkAction::NoAction,
        Some("r") => FkAction::Restrict,
        Some("c") => FkAction::Cascade,
        Some("n") => FkAction::SetNull,
        Some("d") => FkAction::SetDefault,
        _ => FkAction::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relkind_codes_map_to_table_kinds() {
        assert_eq!(relkind_to_table_kind("r"), TableKind::Table);
        assert_eq!(relkind_to_table_kind("m"), TableKind::MaterializedView);
        assert_eq!(relkind_to_table_kind("f"), TableKind::ForeignTable);
    }

    #[test]
    fn fk_action_codes_map_to_actions() {
        assert_eq!(fk_action_from_code(Some("c")), FkAction::Cascade);
        assert_eq!(fk_action_from_code(Some("n")), FkAction::SetNull);
        assert_eq!(fk_action_from_code(None), FkAction::Unknown);
    }

    #[test]
    fn empty_index_key_names_become_expression_keys() {
        let rows = vec![IndexRow {
            table_oid: 10,
            name: "users_lower_email_idx".to_string(),
            columns: vec![String::new(), "email".to_string()],
            is_unique: false,
            is_primary: false,
            method: "btree".to_string(),
        }];

        let mapped = map_indexes(rows);
        assert_eq!(mapped[0].columns, vec![None, Some("email".to_string())]);
    }
}
