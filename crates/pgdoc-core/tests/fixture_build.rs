//! Builds a graph from a JSON-encoded raw catalog, the shape a collector
//! run produces when captured to disk.

use pgdoc_core::{build_graph, ConstraintKind, FkTarget, RawCatalog};

const FIXTURE: &str = r#"
{
  "database": "shop",
  "schemas": [
    { "oid": 16386, "name": "app", "owner": "shop_admin" }
  ],
  "tables": [
    {
      "oid": 16400,
      "schema_oid": 16386,
      "name": "users",
      "kind": "table",
      "comment": "registered accounts"
    },
    {
      "oid": 16410,
      "schema_oid": 16386,
      "name": "orders",
      "kind": "table",
      "comment": null
    }
  ],
  "columns": [
    {
      "table_oid": 16400,
      "ordinal": 1,
      "name": "id",
      "data_type": "bigint",
      "is_nullable": false,
      "default": null,
      "comment": null
    },
    {
      "table_oid": 16400,
      "ordinal": 2,
      "name": "email",
      "data_type": "character varying(255)",
      "is_nullable": false,
      "default": null,
      "comment": null
    },
    {
      "table_oid": 16410,
      "ordinal": 1,
      "name": "id",
      "data_type": "bigint",
      "is_nullable": false,
      "default": null,
      "comment": null
    },
    {
      "table_oid": 16410,
      "ordinal": 2,
      "name": "user_id",
      "data_type": "bigint",
      "is_nullable": true,
      "default": null,
      "comment": null
    }
  ],
  "constraints": [
    {
      "table_oid": 16410,
      "name": "orders_user_id_fkey",
      "kind": "foreign_key",
      "columns": ["user_id"],
      "definition": null,
      "foreign_key": {
        "referenced_table_oid": 16400,
        "referenced_schema": "app",
        "referenced_table": "users",
        "referenced_columns": ["id"],
        "on_update": "no_action",
        "on_delete": "set_null"
      }
    }
  ],
  "indexes": [
    {
      "table_oid": 16400,
      "name": "users_email_key",
      "columns": ["email"],
      "is_unique": true,
      "is_primary": false,
      "method": "btree"
    }
  ]
}
"#;

#[test]
fn builds_graph_from_captured_catalog() {
    let raw: RawCatalog = serde_json::from_str(FIXTURE).expect("fixture parses");
    let graph = build_graph(raw).expect("fixture builds");

    assert_eq!(graph.database(), "shop");
    assert_eq!(graph.table_count(), 2);

    let (_, app) = graph.schemas().next().expect("one schema");
    assert_eq!(app.name, "app");
    assert_eq!(app.owner, "shop_admin");

    let orders = graph.table(app.tables()[0]);
    assert_eq!(orders.name, "orders");

    let fk = graph.constraint(orders.constraints()[0]);
    let ConstraintKind::ForeignKey { target, .. } = &fk.kind else {
        panic!("expected foreign key");
    };
    let FkTarget::Resolved { table, columns } = target else {
        panic!("expected resolved target");
    };
    assert_eq!(graph.table(*table).name, "users");
    assert_eq!(columns.len(), 1);
    assert!(graph.unresolved_foreign_keys().next().is_none());
}
