//! Builds the frozen [`SchemaGraph`] from raw catalog records.
//!
//! Pure function of its input: no I/O, no clock, no global state. All
//! cross-references are resolved here, bottom-up, and the arenas are
//! moved into the graph at the end so nothing can mutate them afterwards.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::{
    ColumnId, ColumnNode, ConstraintId, ConstraintKind, ConstraintNode, FkTarget, IndexId,
    IndexKey, IndexNode, SchemaGraph, SchemaId, SchemaNode, TableId, TableNode,
};
use crate::raw::{RawCatalog, RawConstraintKind};

/// Build the frozen schema graph from collected raw records.
///
/// Resolution order: schemas, tables, columns, then constraints and
/// indexes. Orphaned children (a parent oid absent from the collected
/// set) fail fast: they indicate a collection-filter mismatch the caller
/// must fix. The one deliberate exception is foreign-key targets, which
/// may legitimately lie outside the collected set; those constraints are
/// retained and marked [`FkTarget::Unresolved`].
pub fn build_graph(raw: RawCatalog) -> Result<SchemaGraph> {
    let RawCatalog {
        database,
        mut schemas,
        mut tables,
        mut columns,
        constraints,
        indexes,
    } = raw;

    schemas.sort_by(|left, right| left.name.cmp(&right.name));
    let mut schema_nodes = Vec::with_capacity(schemas.len());
    let mut schema_ids: BTreeMap<i64, SchemaId> = BTreeMap::new();
    for schema in schemas {
        let id = SchemaId(schema_nodes.len() as u32);
        schema_ids.insert(schema.oid, id);
        schema_nodes.push(SchemaNode {
            name: schema.name,
            owner: schema.owner,
            tables: Vec::new(),
        });
    }

    // Global sort by name; per-schema attachment below preserves it, so
    // each schema's table list comes out in lexicographic order.
    tables.sort_by(|left, right| left.name.cmp(&right.name));
    let mut table_nodes = Vec::with_capacity(tables.len());
    let mut table_ids: BTreeMap<i64, TableId> = BTreeMap::new();
    for table in tables {
        let Some(&schema_id) = schema_ids.get(&table.schema_oid) else {
            return Err(Error::OrphanTable {
                table: table.name,
                schema_oid: table.schema_oid,
            });
        };
        let id = TableId(table_nodes.len() as u32);
        table_ids.insert(table.oid, id);
        schema_nodes[schema_id.0 as usize].tables.push(id);
        table_nodes.push(TableNode {
            name: table.name,
            kind: table.kind,
            schema: schema_id,
            comment: table.comment,
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
        });
    }

    columns.sort_by(|left, right| {
        left.table_oid
            .cmp(&right.table_oid)
            .then(left.ordinal.cmp(&right.ordinal))
    });
    let mut column_nodes = Vec::with_capacity(columns.len());
    let mut column_lookup: BTreeMap<TableId, BTreeMap<String, ColumnId>> = BTreeMap::new();
    for column in columns {
        let Some(&table_id) = table_ids.get(&column.table_oid) else {
            return Err(Error::OrphanColumn {
                column: column.name,
                table_oid: column.table_oid,
            });
        };
        let id = ColumnId(column_nodes.len() as u32);
        table_nodes[table_id.0 as usize].columns.push(id);
        column_lookup
            .entry(table_id)
            .or_default()
            .insert(column.name.clone(), id);
        column_nodes.push(ColumnNode {
            name: column.name,
            data_type: column.data_type,
            is_nullable: column.is_nullable,
            default: column.default,
            ordinal: column.ordinal,
            comment: column.comment,
        });
    }

    let mut constraint_nodes = Vec::with_capacity(constraints.len());
    for constraint in constraints {
        let Some(&table_id) = table_ids.get(&constraint.table_oid) else {
            return Err(Error::OrphanConstraint {
                constraint: constraint.name,
                table_oid: constraint.table_oid,
            });
        };
        let table_name = table_nodes[table_id.0 as usize].name.clone();

        let mut own_columns = Vec::with_capacity(constraint.columns.len());
        for column_name in &constraint.columns {
            let Some(&column_id) = column_lookup
                .get(&table_id)
                .and_then(|names| names.get(column_name))
            else {
                return Err(Error::UnknownConstraintColumn {
                    constraint: constraint.name,
                    table: table_name,
                    column: column_name.clone(),
                });
            };
            own_columns.push(column_id);
        }

        let kind = match constraint.kind {
            RawConstraintKind::PrimaryKey => ConstraintKind::PrimaryKey,
            RawConstraintKind::Unique => ConstraintKind::Unique,
            RawConstraintKind::Check => ConstraintKind::Check {
                definition: constraint.definition.unwrap_or_default(),
            },
            RawConstraintKind::ForeignKey => {
                let Some(fk) = constraint.foreign_key else {
                    return Err(Error::Catalog(format!(
                        "foreign key constraint {} on {} carries no reference metadata",
                        constraint.name, table_name
                    )));
                };
                // Resolution goes through the catalog's own identity for
                // the target (its oid), never a bare table name: name
                // matching is ambiguous across schemas.
                let target = match table_ids.get(&fk.referenced_table_oid) {
                    Some(&target_id) => {
                        match resolve_target_columns(
                            target_id,
                            &fk.referenced_columns,
                            &column_lookup,
                        ) {
                            Some(target_columns) => FkTarget::Resolved {
                                table: target_id,
                                columns: target_columns,
                            },
                            None => FkTarget::Unresolved {
                                schema: fk.referenced_schema,
                                table: fk.referenced_table,
                                columns: fk.referenced_columns,
                            },
                        }
                    }
                    None => FkTarget::Unresolved {
                        schema: fk.referenced_schema,
                        table: fk.referenced_table,
                        columns: fk.referenced_columns,
                    },
                };
                ConstraintKind::ForeignKey {
                    on_update: fk.on_update,
                    on_delete: fk.on_delete,
                    target,
                }
            }
        };

        let id = ConstraintId(constraint_nodes.len() as u32);
        table_nodes[table_id.0 as usize].constraints.push(id);
        constraint_nodes.push(ConstraintNode {
            name: constraint.name,
            table: table_id,
            kind,
            columns: own_columns,
        });
    }

    let mut index_nodes = Vec::with_capacity(indexes.len());
    for index in indexes {
        let Some(&table_id) = table_ids.get(&index.table_oid) else {
            return Err(Error::OrphanIndex {
                index: index.name,
                table_oid: index.table_oid,
            });
        };
        let table_name = &table_nodes[table_id.0 as usize].name;

        let mut keys = Vec::with_capacity(index.columns.len());
        for key in &index.columns {
            match key {
                None => keys.push(IndexKey::Expression),
                Some(column_name) => {
                    let Some(&column_id) = column_lookup
                        .get(&table_id)
                        .and_then(|names| names.get(column_name))
                    else {
                        return Err(Error::UnknownIndexColumn {
                            index: index.name,
                            table: table_name.clone(),
                            column: column_name.clone(),
                        });
                    };
                    keys.push(IndexKey::Column(column_id));
                }
            }
        }

        let id = IndexId(index_nodes.len() as u32);
        table_nodes[table_id.0 as usize].indexes.push(id);
        index_nodes.push(IndexNode {
            name: index.name,
            table: table_id,
            is_unique: index.is_unique,
            is_primary: index.is_primary,
            method: index.method,
            keys,
        });
    }

    for table in &mut table_nodes {
        table.constraints.sort_by(|left, right| {
            let lhs = &constraint_nodes[left.0 as usize];
            let rhs = &constraint_nodes[right.0 as usize];
            lhs.kind
                .rank()
                .cmp(&rhs.kind.rank())
                .then_with(|| lhs.name.cmp(&rhs.name))
        });
        table.indexes.sort_by(|left, right| {
            index_nodes[left.0 as usize]
                .name
                .cmp(&index_nodes[right.0 as usize].name)
        });
    }

    Ok(SchemaGraph {
        database,
        schemas: schema_nodes,
        tables: table_nodes,
        columns: column_nodes,
        constraints: constraint_nodes,
        indexes: index_nodes,
    })
}

/// Resolve referenced column names within an already-resolved target
/// table. `None` when any name is missing there, in which case the whole
/// reference is treated as unresolved.
fn resolve_target_columns(
    target: TableId,
    names: &[String],
    column_lookup: &BTreeMap<TableId, BTreeMap<String, ColumnId>>,
) -> Option<Vec<ColumnId>> {
    let columns = column_lookup.get(&target)?;
    names
        .iter()
        .map(|name| columns.get(name).copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FkAction, TableKind};
    use crate::raw::{RawColumn, RawConstraint, RawForeignKey, RawIndex, RawSchema, RawTable};

    fn schema(oid: i64, name: &str) -> RawSchema {
        RawSchema {
            oid,
            name: name.to_string(),
            owner: "postgres".to_string(),
        }
    }

    fn table(oid: i64, schema_oid: i64, name: &str) -> RawTable {
        RawTable {
            oid,
            schema_oid,
            name: name.to_string(),
            kind: TableKind::Table,
            comment: None,
        }
    }

    fn column(table_oid: i64, ordinal: i16, name: &str) -> RawColumn {
        RawColumn {
            table_oid,
            ordinal,
            name: name.to_string(),
            data_type: "integer".to_string(),
            is_nullable: false,
            default: None,
            comment: None,
        }
    }

    fn foreign_key(
        table_oid: i64,
        name: &str,
        columns: &[&str],
        referenced_table_oid: i64,
        referenced: (&str, &str),
        referenced_columns: &[&str],
    ) -> RawConstraint {
        RawConstraint {
            table_oid,
            name: name.to_string(),
            kind: RawConstraintKind::ForeignKey,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            definition: None,
            foreign_key: Some(RawForeignKey {
                referenced_table_oid,
                referenced_schema: referenced.0.to_string(),
                referenced_table: referenced.1.to_string(),
                referenced_columns: referenced_columns.iter().map(|c| c.to_string()).collect(),
                on_update: FkAction::NoAction,
                on_delete: FkAction::Cascade,
            }),
        }
    }

    #[test]
    fn orphan_table_fails_fast() {
        let raw = RawCatalog {
            schemas: vec![schema(1, "public")],
            tables: vec![table(10, 99, "users")],
            ..RawCatalog::default()
        };

        let err = build_graph(raw).unwrap_err();
        assert!(matches!(err, Error::OrphanTable { schema_oid: 99, .. }));
    }

    #[test]
    fn orphan_column_fails_fast() {
        let raw = RawCatalog {
            schemas: vec![schema(1, "public")],
            tables: vec![table(10, 1, "users")],
            columns: vec![column(11, 1, "id")],
            ..RawCatalog::default()
        };

        let err = build_graph(raw).unwrap_err();
        assert!(matches!(err, Error::OrphanColumn { table_oid: 11, .. }));
    }

    #[test]
    fn tables_attach_to_schemas_in_name_order() {
        let raw = RawCatalog {
            schemas: vec![schema(2, "b_schema"), schema(1, "a_schema")],
            tables: vec![
                table(10, 2, "zebra"),
                table(11, 2, "apple"),
                table(12, 1, "mango"),
            ],
            ..RawCatalog::default()
        };

        let graph = build_graph(raw).unwrap();
        let names: Vec<&str> = graph.schemas().map(|(_, s)| s.name.as_str()).collect();
        assert_eq!(names, vec!["a_schema", "b_schema"]);

        let (_, b_schema) = graph.schemas().nth(1).unwrap();
        let table_names: Vec<&str> = b_schema
            .tables()
            .iter()
            .map(|&id| graph.table(id).name.as_str())
            .collect();
        assert_eq!(table_names, vec!["apple", "zebra"]);
    }

    #[test]
    fn columns_keep_ordinal_order() {
        let raw = RawCatalog {
            schemas: vec![schema(1, "public")],
            tables: vec![table(10, 1, "users")],
            // Deliberately shuffled input; ordinals decide.
            columns: vec![
                column(10, 3, "email"),
                column(10, 1, "id"),
                column(10, 2, "name"),
            ],
            ..RawCatalog::default()
        };

        let graph = build_graph(raw).unwrap();
        let (_, public) = graph.schemas().next().unwrap();
        let users = graph.table(public.tables()[0]);
        let names: Vec<&str> = users
            .columns()
            .iter()
            .map(|&id| graph.column(id).name.as_str())
            .collect();
        assert_eq!(names, vec!["id", "name", "email"]);
    }

    #[test]
    fn foreign_key_resolves_by_oid_not_bare_name() {
        // Two tables named "users" in different schemas; the constraint
        // references oid 20 and must land on b_schema.users.
        let raw = RawCatalog {
            schemas: vec![schema(1, "a_schema"), schema(2, "b_schema")],
            tables: vec![
                table(10, 1, "users"),
                table(20, 2, "users"),
                table(30, 1, "orders"),
            ],
            columns: vec![
                column(10, 1, "id"),
                column(20, 1, "id"),
                column(30, 1, "id"),
                column(30, 2, "user_id"),
            ],
            constraints: vec![foreign_key(
                30,
                "orders_user_fk",
                &["user_id"],
                20,
                ("b_schema", "users"),
                &["id"],
            )],
            ..RawCatalog::default()
        };

        let graph = build_graph(raw).unwrap();
        let (_, constraint) = graph
            .schemas()
            .flat_map(|(_, s)| s.tables())
            .flat_map(|&t| graph.table(t).constraints())
            .map(|&c| (c, graph.constraint(c)))
            .next()
            .unwrap();

        let ConstraintKind::ForeignKey { target, .. } = &constraint.kind else {
            panic!("expected foreign key");
        };
        let FkTarget::Resolved { table, .. } = target else {
            panic!("expected resolved target");
        };
        let resolved = graph.table(*table);
        assert_eq!(graph.schema(resolved.schema).name, "b_schema");
    }

    #[test]
    fn foreign_key_to_missing_target_is_retained_unresolved() {
        let raw = RawCatalog {
            schemas: vec![schema(1, "public")],
            tables: vec![table(10, 1, "orders")],
            columns: vec![column(10, 1, "user_id")],
            constraints: vec![foreign_key(
                10,
                "orders_user_fk",
                &["user_id"],
                999,
                ("accounts", "users"),
                &["id"],
            )],
            ..RawCatalog::default()
        };

        let graph = build_graph(raw).unwrap();
        let unresolved: Vec<_> = graph.unresolved_foreign_keys().collect();
        assert_eq!(unresolved.len(), 1);

        let (_, node) = &unresolved[0];
        let ConstraintKind::ForeignKey { target, .. } = &node.kind else {
            panic!("expected foreign key");
        };
        let FkTarget::Unresolved { schema, table, .. } = target else {
            panic!("expected unresolved target");
        };
        assert_eq!(schema, "accounts");
        assert_eq!(table, "users");
    }

    #[test]
    fn constraints_sort_by_kind_rank_then_name() {
        let check = RawConstraint {
            table_oid: 10,
            name: "a_check".to_string(),
            kind: RawConstraintKind::Check,
            columns: Vec::new(),
            definition: Some("CHECK ((id > 0))".to_string()),
            foreign_key: None,
        };
        let pk = RawConstraint {
            table_oid: 10,
            name: "z_pkey".to_string(),
            kind: RawConstraintKind::PrimaryKey,
            columns: vec!["id".to_string()],
            definition: None,
            foreign_key: None,
        };

        let raw = RawCatalog {
            schemas: vec![schema(1, "public")],
            tables: vec![table(10, 1, "users")],
            columns: vec![column(10, 1, "id")],
            constraints: vec![check, pk],
            ..RawCatalog::default()
        };

        let graph = build_graph(raw).unwrap();
        let (_, public) = graph.schemas().next().unwrap();
        let users = graph.table(public.tables()[0]);
        let order: Vec<&str> = users
            .constraints()
            .iter()
            .map(|&id| graph.constraint(id).name.as_str())
            .collect();
        // Primary key ranks before check despite its later name.
        assert_eq!(order, vec!["z_pkey", "a_check"]);
    }

    #[test]
    fn expression_index_keys_survive_resolution() {
        let raw = RawCatalog {
            schemas: vec![schema(1, "public")],
            tables: vec![table(10, 1, "users")],
            columns: vec![column(10, 1, "email")],
            indexes: vec![RawIndex {
                table_oid: 10,
                name: "users_email_lower_idx".to_string(),
                columns: vec![None, Some("email".to_string())],
                is_unique: true,
                is_primary: false,
                method: "btree".to_string(),
            }],
            ..RawCatalog::default()
        };

        let graph = build_graph(raw).unwrap();
        let (_, public) = graph.schemas().next().unwrap();
        let users = graph.table(public.tables()[0]);
        let index = graph.index(users.indexes()[0]);
        assert!(matches!(index.keys()[0], IndexKey::Expression));
        assert!(matches!(index.keys()[1], IndexKey::Column(_)));
    }
}
