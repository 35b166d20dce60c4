//! Storage collaborator: the operations handlers need, over PostgreSQL or memory.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::record::{FieldValue, Fields, Record};
use crate::schema::EntitySchema;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database: {0}")]
    Database(#[source] sqlx::Error),
    /// A unique constraint rejected the write.
    #[error("{0}")]
    Conflict(String),
    /// A NOT NULL or CHECK constraint rejected the write.
    #[error("{0}")]
    Constraint(String),
    /// The row to update no longer exists.
    #[error("{0}")]
    Missing(String),
    #[error("corrupt row: {0}")]
    Corrupt(String),
    #[error("invalid DATABASE_URL: {0}")]
    Url(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            match db.code().as_deref() {
                Some("23505") => return StoreError::Conflict(db.message().to_string()),
                Some("23502") | Some("23514") => {
                    return StoreError::Constraint(db.message().to_string())
                }
                _ => {}
            }
        }
        StoreError::Database(e)
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, schema: &'static EntitySchema, id: i64) -> Result<Option<Record>, StoreError>;

    /// Rows whose columns equal every filter value, ascending by primary key.
    async fn filter(
        &self,
        schema: &'static EntitySchema,
        filters: &[(&str, FieldValue)],
    ) -> Result<Vec<Record>, StoreError>;

    /// Insert a row; the primary key is assigned by the store.
    async fn create(&self, schema: &'static EntitySchema, fields: Fields) -> Result<Record, StoreError>;

    /// Write every column of an existing row.
    async fn save(&self, schema: &'static EntitySchema, record: &Record) -> Result<(), StoreError>;

    /// Insert a row and point `owner`'s `link_column` at it, as one unit of work: either both
    /// writes land or neither does. Returns the new row and the updated owner.
    async fn create_linked(
        &self,
        schema: &'static EntitySchema,
        fields: Fields,
        owner_schema: &'static EntitySchema,
        owner: &Record,
        link_column: &'static str,
    ) -> Result<(Record, Record), StoreError>;

    /// Returns false when no row had that id.
    async fn delete(&self, schema: &'static EntitySchema, id: i64) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn all(&self, schema: &'static EntitySchema) -> Result<Vec<Record>, StoreError> {
        self.filter(schema, &[]).await
    }

    async fn first(
        &self,
        schema: &'static EntitySchema,
        filters: &[(&str, FieldValue)],
    ) -> Result<Option<Record>, StoreError> {
        Ok(self.filter(schema, filters).await?.into_iter().next())
    }
}
