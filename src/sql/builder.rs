//! Builds parameterized SELECT, INSERT, UPDATE and DELETE statements from entity schemas.

use super::params::PgBindValue;
use crate::record::{FieldValue, Fields, Record};
use crate::schema::{Column, EntitySchema, ValueKind};

/// Quote identifier for PostgreSQL (safe: only from schema constants).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a value for `column` and return its placeholder, cast where the bind type differs from the column type.
    fn push_param(&mut self, column: &Column, value: &FieldValue) -> String {
        self.params.push(PgBindValue::from_field(column.kind, value));
        let n = self.params.len();
        match column.kind {
            ValueKind::Decimal => format!("${}::numeric", n),
            _ => format!("${}", n),
        }
    }

    fn push_id(&mut self, id: i64) -> String {
        self.params.push(PgBindValue::Int(Some(id)));
        format!("${}", self.params.len())
    }
}

/// SELECT list in schema order; numeric as col::text so the row decodes without a decimal crate.
pub(crate) fn select_column_list(schema: &EntitySchema) -> String {
    schema
        .columns
        .iter()
        .map(|c| {
            let q = quoted(c.name);
            match c.kind {
                ValueKind::Decimal => format!("{}::text AS {}", q, q),
                _ => q,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// SELECT by primary key.
pub fn select_by_id(schema: &EntitySchema, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_id(id);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(schema),
        quoted(schema.table),
        quoted(schema.primary_key),
        ph
    );
    q
}

/// SELECT with exact-match filters (ANDed; null matches IS NULL), ORDER BY pk.
/// Filters on unknown columns are skipped.
pub fn select_where(schema: &EntitySchema, filters: &[(&str, FieldValue)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    for (name, value) in filters {
        let Some(column) = schema.column(name) else {
            continue;
        };
        if value.is_null() {
            where_parts.push(format!("{} IS NULL", quoted(name)));
        } else {
            let ph = q.push_param(column, value);
            where_parts.push(format!("{} = {}", quoted(name), ph));
        }
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {}{} ORDER BY {}",
        select_column_list(schema),
        quoted(schema.table),
        where_clause,
        quoted(schema.primary_key)
    );
    q
}

/// INSERT the given non-key columns; the primary key comes from the sequence.
pub fn insert(schema: &EntitySchema, fields: &Fields) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for c in schema.data_columns() {
        let Some(value) = fields.get(c.name) else {
            continue;
        };
        placeholders.push(q.push_param(c, value));
        cols.push(quoted(c.name));
    }
    let table = quoted(schema.table);
    let returning = select_column_list(schema);
    q.sql = if cols.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning)
    } else {
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table,
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// UPDATE every non-key column of the record by primary key.
pub fn update(schema: &EntitySchema, record: &Record) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in schema.data_columns() {
        let ph = q.push_param(c, record.get(c.name));
        sets.push(format!("{} = {}", quoted(c.name), ph));
    }
    let id_ph = q.push_id(record.id);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        quoted(schema.table),
        sets.join(", "),
        quoted(schema.primary_key),
        id_ph
    );
    q
}

/// DELETE by primary key.
pub fn delete(schema: &EntitySchema, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let ph = q.push_id(id);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        quoted(schema.table),
        quoted(schema.primary_key),
        ph
    );
    q
}
