//! In-memory store. Enforces the same NOT NULL and UNIQUE rules as the generated DDL.

use super::{Store, StoreError};
use crate::record::{FieldValue, Fields, Record};
use crate::schema::EntitySchema;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Record>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<&'static str, Table>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(schema: &EntitySchema, record: &Record, filters: &[(&str, FieldValue)]) -> bool {
    filters.iter().all(|(name, value)| {
        if *name == schema.primary_key {
            value.as_i64() == Some(record.id)
        } else {
            record.get(name) == value
        }
    })
}

/// Unknown columns and values of the wrong kind never reach a real table either.
fn check_shape(schema: &EntitySchema, fields: &Fields) -> Result<(), StoreError> {
    for (name, value) in fields {
        let column = schema
            .column(name)
            .filter(|c| c.name != schema.primary_key)
            .ok_or_else(|| StoreError::Corrupt(format!("{} has no writable column {}", schema.table, name)))?;
        if !value.fits(column.kind) {
            return Err(StoreError::Corrupt(format!(
                "value {} does not fit column {}.{}",
                value, schema.table, name
            )));
        }
    }
    Ok(())
}

fn check_not_null(schema: &EntitySchema, fields: &Fields) -> Result<(), StoreError> {
    for c in schema.required_columns() {
        if fields.get(c.name).map_or(true, FieldValue::is_null) {
            return Err(StoreError::Constraint(format!(
                "null value in column \"{}\" of relation \"{}\" violates not-null constraint",
                c.name, schema.table
            )));
        }
    }
    Ok(())
}

fn check_unique(schema: &EntitySchema, table: &Table, id: i64, fields: &Fields) -> Result<(), StoreError> {
    for set in schema.unique {
        let values: Vec<&FieldValue> = set
            .iter()
            .map(|c| fields.get(*c).unwrap_or(&FieldValue::Null))
            .collect();
        if values.iter().any(|v| v.is_null()) {
            continue;
        }
        let clash = table.rows.values().any(|row| {
            row.id != id && set.iter().zip(&values).all(|(c, v)| row.get(c) == *v)
        });
        if clash {
            return Err(StoreError::Conflict(format!(
                "duplicate key value violates unique constraint on {} ({})",
                schema.table,
                set.join(", ")
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get(&self, schema: &'static EntitySchema, id: i64) -> Result<Option<Record>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(schema.table)
            .and_then(|t| t.rows.get(&id))
            .cloned())
    }

    async fn filter(
        &self,
        schema: &'static EntitySchema,
        filters: &[(&str, FieldValue)],
    ) -> Result<Vec<Record>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(schema.table)
            .map(|t| {
                t.rows
                    .values()
                    .filter(|r| matches(schema, r, filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create(&self, schema: &'static EntitySchema, fields: Fields) -> Result<Record, StoreError> {
        check_shape(schema, &fields)?;
        check_not_null(schema, &fields)?;
        let mut tables = self.tables.write().await;
        let table = tables.entry(schema.table).or_default();
        let id = table.last_id + 1;
        check_unique(schema, table, id, &fields)?;
        table.last_id = id;
        let record = Record { id, fields };
        table.rows.insert(id, record.clone());
        tracing::debug!(table = schema.table, id, "row created");
        Ok(record)
    }

    async fn save(&self, schema: &'static EntitySchema, record: &Record) -> Result<(), StoreError> {
        check_shape(schema, &record.fields)?;
        check_not_null(schema, &record.fields)?;
        let mut tables = self.tables.write().await;
        let table = tables.entry(schema.table).or_default();
        if !table.rows.contains_key(&record.id) {
            return Err(StoreError::Missing(format!(
                "{} row {} no longer exists",
                schema.table, record.id
            )));
        }
        check_unique(schema, table, record.id, &record.fields)?;
        table.rows.insert(record.id, record.clone());
        Ok(())
    }

    async fn create_linked(
        &self,
        schema: &'static EntitySchema,
        fields: Fields,
        owner_schema: &'static EntitySchema,
        owner: &Record,
        link_column: &'static str,
    ) -> Result<(Record, Record), StoreError> {
        check_shape(schema, &fields)?;
        check_not_null(schema, &fields)?;
        let mut tables = self.tables.write().await;
        // Every check runs before either table changes.
        let id = tables.get(schema.table).map_or(0, |t| t.last_id) + 1;
        let mut owner = owner.clone();
        owner.set(link_column, id);
        check_shape(owner_schema, &owner.fields)?;
        check_not_null(owner_schema, &owner.fields)?;
        let owners = tables.entry(owner_schema.table).or_default();
        if !owners.rows.contains_key(&owner.id) {
            return Err(StoreError::Missing(format!(
                "{} row {} no longer exists",
                owner_schema.table, owner.id
            )));
        }
        check_unique(owner_schema, owners, owner.id, &owner.fields)?;
        let table = tables.entry(schema.table).or_default();
        check_unique(schema, table, id, &fields)?;

        table.last_id = id;
        let created = Record { id, fields };
        table.rows.insert(id, created.clone());
        tables
            .entry(owner_schema.table)
            .or_default()
            .rows
            .insert(owner.id, owner.clone());
        tracing::debug!(table = schema.table, id, owner = owner_schema.table, "linked row created");
        Ok((created, owner))
    }

    async fn delete(&self, schema: &'static EntitySchema, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(schema.table)
            .and_then(|t| t.rows.remove(&id))
            .is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
