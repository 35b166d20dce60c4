//! Typed bind values for PostgreSQL queries. Each variant carries its SQL type, so nulls bind with the right type too.

use crate::record::FieldValue;
use crate::schema::ValueKind;
use chrono::NaiveDate;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Date(Option<NaiveDate>),
    Bytes(Option<Vec<u8>>),
}

impl PgBindValue {
    /// Bind value for `value` stored in a column of `kind`. Values of the wrong shape bind as a typed null.
    pub fn from_field(kind: ValueKind, value: &FieldValue) -> Self {
        match kind {
            ValueKind::Integer => PgBindValue::Int(value.as_i64()),
            ValueKind::Decimal => PgBindValue::Float(match value {
                FieldValue::Decimal(f) => Some(*f),
                FieldValue::Integer(n) => Some(*n as f64),
                _ => None,
            }),
            ValueKind::Text | ValueKind::Enum(_) => PgBindValue::Text(match value {
                FieldValue::Text(s) => Some(s.clone()),
                _ => None,
            }),
            ValueKind::Date => PgBindValue::Date(match value {
                FieldValue::Date(d) => Some(*d),
                _ => None,
            }),
            ValueKind::Bytes => PgBindValue::Bytes(value.as_bytes().map(<[u8]>::to_vec)),
        }
    }
}

/// Bind every param in order.
pub fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: Vec<PgBindValue>,
) -> Query<'q, Postgres, PgArguments> {
    for p in params {
        query = match p {
            PgBindValue::Int(v) => query.bind(v),
            PgBindValue::Float(v) => query.bind(v),
            PgBindValue::Text(v) => query.bind(v),
            PgBindValue::Date(v) => query.bind(v),
            PgBindValue::Bytes(v) => query.bind(v),
        };
    }
    query
}
