//! Read-only queries against the PostgreSQL system catalogs.
//!
//! Each query fetches one entity family for the whole filtered catalog
//! in a single round trip, carrying catalog oids (cast to `int8`) so the
//! builder can resolve cross-references without name matching. All
//! queries bind the same filter parameters: `$1` explicit schema list
//! (empty = no filter), `$2` include-system-schemas flag, and — where
//! table-like objects are involved — `$3` the relkind set.

use sqlx::PgPool;

use pgdoc_core::{Error, Result};

use crate::options::CatalogFilter;

fn db_err(err: sqlx::Error) -> Error {
    Error::Catalog(err.to_string())
}

pub(crate) async fn fetch_database_name(pool: &PgPool) -> Result<String> {
    sqlx::query_scalar::<_, String>("select current_database()")
        .fetch_one(pool)
        .await
        .map_err(db_err)
}

#[derive(sqlx::FromRow)]
pub(crate) struct SchemaRow {
    pub oid: i64,
    pub name: String,
    pub owner: String,
}

const SCHEMAS_SQL: &str = r#"
select n.oid::int8 as oid,
       n.nspname as name,
       r.rolname as owner
from pg_namespace n
join pg_roles r on r.oid = n.nspowner
where (cardinality($1::text[]) = 0 or n.nspname = any($1))
  and ($2 or (n.nspname !~ '^pg_' and n.nspname <> 'information_schema'))
order by n.nspname
"#;

pub(crate) async fn list_schemas(pool: &PgPool, filter: &CatalogFilter) -> Result<Vec<SchemaRow>> {
    sqlx::query_as::<_, SchemaRow>(SCHEMAS_SQL)
        .bind(&filter.schemas)
        .bind(filter.include_system_schemas)
        .fetch_all(pool)
        .await
        .map_err(db_err)
}

#[derive(sqlx::FromRow)]
pub(crate) struct TableRow {
    pub oid: i64,
    pub schema_oid: i64,
    pub name: String,
    pub relkind: String,
    pub comment: Option<String>,
}

const TABLES_SQL: &str = r#"
select c.oid::int8 as oid,
       c.relnamespace::int8 as schema_oid,
       c.relname as name,
       c.relkind::text as relkind,
       pg_catalog.obj_description(c.oid, 'pg_class') as comment
from pg_class c
join pg_namespace n on n.oid = c.relnamespace
where c.relkind::text = any($3)
  and (cardinality($1::text[]) = 0 or n.nspname = any($1))
  and ($2 or (n.nspname !~ '^pg_' and n.nspname <> 'information_schema'))
order by c.relname
"#;

pub(crate) async fn list_tables(pool: &PgPool, filter: &CatalogFilter) -> Result<Vec<TableRow>> {
    sqlx::query_as::<_, TableRow>(TABLES_SQL)
        .bind(&filter.schemas)
        .bind(filter.include_system_schemas)
        .bind(&filter.relkinds)
        .fetch_all(pool)
        .await
        .map_err(db_err)
}

#[derive(sqlx::FromRow)]
pub(crate) struct ColumnRow {
    pub table_oid: i64,
    pub ordinal: i16,
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    #[sqlx(rename = "default")]
    pub default_expr: Option<String>,
    pub comment: Option<String>,
}

const COLUMNS_SQL: &str = r#"
select a.attrelid::int8 as table_oid,
       a.attnum as ordinal,
       a.attname as name,
       pg_catalog.format_type(a.atttypid, a.atttypmod) as data_type,
       not a.attnotnull as is_nullable,
       pg_get_expr(ad.adbin, ad.adrelid) as "default",
       pg_catalog.col_description(a.attrelid, a.attnum) as comment
from pg_attribute a
join pg_class c on c.oid = a.attrelid
join pg_namespace n on n.oid = c.relnamespace
left join pg_attrdef ad on ad.adrelid = a.attrelid and ad.adnum = a.attnum
where a.attnum > 0
  and not a.attisdropped
  and c.relkind::text = any($3)
  and (cardinality($1::text[]) = 0 or n.nspname = any($1))
  and ($2 or (n.nspname !~ '^pg_' and n.nspname <> 'information_schema'))
order by a.attrelid, a.attnum
"#;

pub(crate) async fn list_columns(pool: &PgPool, filter: &CatalogFilter) -> Result<Vec<ColumnRow>> {
    sqlx::query_as::<_, ColumnRow>(COLUMNS_SQL)
        .bind(&filter.schemas)
        .bind(filter.include_system_schemas)
        .bind(&filter.relkinds)
        .fetch_all(pool)
        .await
        .map_err(db_err)
}

#[derive(sqlx::FromRow)]
pub(crate) struct ConstraintRow {
    pub table_oid: i64,
    pub name: String,
    pub contype: String,
    pub columns: Vec<String>,
    pub definition: Option<String>,
    pub referenced_table_oid: Option<i64>,
    pub referenced_schema: Option<String>,
    pub referenced_table: Option<String>,
    pub referenced_columns: Vec<String>,
    pub on_update: Option<String>,
    pub on_delete: Option<String>,
}

const CONSTRAINTS_SQL: &str = r#"
select con.conrelid::int8 as table_oid,
       con.conname as name,
       con.contype::text as contype,
       coalesce(own.names, '{}') as columns,
       case when con.contype = 'c' then pg_get_constraintdef(con.oid, true) end as definition,
       nullif(con.confrelid::int8, 0) as referenced_table_oid,
       ref_nsp.nspname as referenced_schema,
       ref_rel.relname as referenced_table,
       coalesce(ref.names, '{}') as referenced_columns,
       case when con.contype = 'f' then con.confupdtype::text end as on_update,
       case when con.contype = 'f' then con.confdeltype::text end as on_delete
from pg_constraint con
join pg_class rel on rel.oid = con.conrelid
join pg_namespace nsp on nsp.oid = rel.relnamespace
left join pg_class ref_rel on ref_rel.oid = con.confrelid
left join pg_namespace ref_nsp on ref_nsp.oid = ref_rel.relnamespace
left join lateral (
    select array_agg(att.attname order by ord.ordinality) as names
    from unnest(con.conkey) with ordinality as ord(attnum, ordinality)
    join pg_attribute att on att.attrelid = con.conrelid and att.attnum = ord.attnum
) own on true
left join lateral (
    select array_agg(att.attname order by ord.ordinality) as names
    from unnest(con.confkey) with ordinality as ord(attnum, ordinality)
    join pg_attribute att on att.attrelid = con.confrelid and att.attnum = ord.attnum
) ref on true
where con.contype in ('p', 'u', 'f', 'c')
  and rel.relkind::text = any($3)
  and (cardinality($1::text[]) = 0 or nsp.nspname = any($1))
  and ($2 or (nsp.nspname !~ '^pg_' and nsp.nspname <> 'information_schema'))
order by rel.oid, con.conname
"#;

pub(crate) async fn list_constraints(
    pool: &PgPool,
    filter: &CatalogFilter,
) -> Result<Vec<ConstraintRow>> {
    sqlx::query_as::<_, ConstraintRow>(CONSTRAINTS_SQL)
        .bind(&filter.schemas)
        .bind(filter.include_system_schemas)
        .bind(&filter.relkinds)
        .fetch_all(pool)
        .await
        .map_err(db_err)
}

#[derive(sqlx::FromRow)]
pub(crate) struct IndexRow {
    pub table_oid: i64,
    pub name: String,
    pub columns: Vec<String>,
    pub is_unique: bool,
    pub is_primary: bool,
    pub method: String,
}

const INDEXES_SQL: &str = r#"
select i.indrelid::int8 as table_oid,
       idx.relname as name,
       coalesce(keys.names, '{}') as columns,
       i.indisunique as is_unique,
       i.indisprimary as is_primary,
       am.amname as method
from pg_index i
join pg_class tbl on tbl.oid = i.indrelid
join pg_namespace nsp on nsp.oid = tbl.relnamespace
join pg_class idx on idx.oid = i.indexrelid
join pg_am am on am.oid = idx.relam
left join lateral (
    select array_agg(coalesce(att.attname, '') order by ord.ordinality) as names
    from unnest(i.indkey::int2[]) with ordinality as ord(attnum, ordinality)
    left join pg_attribute att
      on att.attrelid = i.indrelid and att.attnum = ord.attnum and ord.attnum > 0
) keys on true
where tbl.relkind::text = any($3)
  and (cardinality($1::text[]) = 0 or nsp.nspname = any($1))
  and ($2 or (nsp.nspname !~ '^pg_' and nsp.nspname <> 'information_schema'))
order by tbl.oid, idx.relname
"#;

pub(crate) async fn list_indexes(pool: &PgPool, filter: &CatalogFilter) -> Result<Vec<IndexRow>> {
    sqlx::query_as::<_, IndexRow>(INDEXES_SQL)
        .bind(&filter.schemas)
        .bind(filter.include_system_schemas)
        .bind(&filter.relkinds)
        .fetch_all(pool)
        .await
        .map_err(db_err)
}
