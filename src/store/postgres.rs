//! PostgreSQL store over a sqlx pool.

use super::{Store, StoreError};
use crate::record::{FieldValue, Fields, Record};
use crate::schema::{EntitySchema, ValueKind};
use crate::sql::{self, bind_all, QueryBuf};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{ConnectOptions, PgPool, Row};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_all(&self, q: QueryBuf) -> Result<Vec<PgRow>, StoreError> {
        tracing::debug!(sql = %q.sql, params = q.params.len(), "query");
        Ok(bind_all(sqlx::query(&q.sql), q.params)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn fetch_optional(&self, q: QueryBuf) -> Result<Option<PgRow>, StoreError> {
        tracing::debug!(sql = %q.sql, params = q.params.len(), "query");
        Ok(bind_all(sqlx::query(&q.sql), q.params)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn execute(&self, q: QueryBuf) -> Result<u64, StoreError> {
        tracing::debug!(sql = %q.sql, params = q.params.len(), "execute");
        let done = bind_all(sqlx::query(&q.sql), q.params)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected())
    }
}

/// Decode a row selected with the schema's column list.
fn decode_row(schema: &EntitySchema, row: &PgRow) -> Result<Record, StoreError> {
    let id: i64 = row.try_get(schema.primary_key)?;
    let mut fields = Fields::new();
    for c in schema.data_columns() {
        let value: FieldValue = match c.kind {
            ValueKind::Integer => row.try_get::<Option<i64>, _>(c.name)?.into(),
            ValueKind::Decimal => match row.try_get::<Option<String>, _>(c.name)? {
                Some(s) => FieldValue::Decimal(s.parse().map_err(|_| {
                    StoreError::Corrupt(format!("{}.{} is not numeric: {}", schema.table, c.name, s))
                })?),
                None => FieldValue::Null,
            },
            ValueKind::Text | ValueKind::Enum(_) => row
                .try_get::<Option<String>, _>(c.name)?
                .map(FieldValue::Text)
                .unwrap_or(FieldValue::Null),
            ValueKind::Date => row
                .try_get::<Option<NaiveDate>, _>(c.name)?
                .map(FieldValue::Date)
                .unwrap_or(FieldValue::Null),
            ValueKind::Bytes => row
                .try_get::<Option<Vec<u8>>, _>(c.name)?
                .map(FieldValue::Bytes)
                .unwrap_or(FieldValue::Null),
        };
        fields.insert(c.name.to_string(), value);
    }
    Ok(Record { id, fields })
}

#[async_trait]
impl Store for PgStore {
    async fn get(&self, schema: &'static EntitySchema, id: i64) -> Result<Option<Record>, StoreError> {
        self.fetch_optional(sql::select_by_id(schema, id))
            .await?
            .map(|row| decode_row(schema, &row))
            .transpose()
    }

    async fn filter(
        &self,
        schema: &'static EntitySchema,
        filters: &[(&str, FieldValue)],
    ) -> Result<Vec<Record>, StoreError> {
        self.fetch_all(sql::select_where(schema, filters))
            .await?
            .iter()
            .map(|row| decode_row(schema, row))
            .collect()
    }

    async fn create(&self, schema: &'static EntitySchema, fields: Fields) -> Result<Record, StoreError> {
        let row = self
            .fetch_optional(sql::insert(schema, &fields))
            .await?
            .ok_or_else(|| StoreError::Missing(format!("insert into {} returned no row", schema.table)))?;
        decode_row(schema, &row)
    }

    async fn save(&self, schema: &'static EntitySchema, record: &Record) -> Result<(), StoreError> {
        let affected = self.execute(sql::update(schema, record)).await?;
        if affected == 0 {
            return Err(StoreError::Missing(format!(
                "{} row {} no longer exists",
                schema.table, record.id
            )));
        }
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
        let mut tx = self.pool.begin().await?;

        let q = sql::insert(schema, &fields);
        tracing::debug!(sql = %q.sql, params = q.params.len(), "query in transaction");
        let row = bind_all(sqlx::query(&q.sql), q.params)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::Missing(format!("insert into {} returned no row", schema.table)))?;
        let created = decode_row(schema, &row)?;

        let mut owner = owner.clone();
        owner.set(link_column, created.id);
        let q = sql::update(owner_schema, &owner);
        tracing::debug!(sql = %q.sql, params = q.params.len(), "execute in transaction");
        let done = bind_all(sqlx::query(&q.sql), q.params)
            .execute(&mut *tx)
            .await?;
        if done.rows_affected() == 0 {
            // Dropping `tx` rolls the insert back.
            return Err(StoreError::Missing(format!(
                "{} row {} no longer exists",
                owner_schema.table, owner.id
            )));
        }

        tx.commit().await?;
        Ok((created, owner))
    }

    async fn delete(&self, schema: &'static EntitySchema, id: i64) -> Result<bool, StoreError> {
        Ok(self.execute(sql::delete(schema, id)).await? > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| StoreError::Url(e.to_string()))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", sql::builder::quoted(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

/// Split a connection URL into (admin URL on the `postgres` database, target database name).
fn parse_db_name_from_url(url: &str) -> Result<(String, String), StoreError> {
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    let path_start = url
        .get(scheme_end..)
        .and_then(|rest| rest.find('/'))
        .map(|i| scheme_end + i + 1)
        .ok_or_else(|| StoreError::Url("no database path".into()))?;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let mut parts = path_and_query.splitn(2, '?');
    let db_name = parts.next().unwrap_or("").trim().to_string();
    let query = parts.next().map(|q| format!("?{}", q)).unwrap_or_default();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres{}", base, query), db_name))
}
