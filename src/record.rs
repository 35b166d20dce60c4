//! Typed column values and stored records.

use crate::schema::{EntitySchema, ValueKind};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One column value after validation or after loading from storage.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Decimal(f64),
    Text(String),
    Date(NaiveDate),
    Bytes(Vec<u8>),
}

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Integer(n) => Value::from(*n),
            FieldValue::Decimal(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            FieldValue::Bytes(b) => Value::String(BASE64.encode(b)),
        }
    }

    /// True when this value can be stored in a column of `kind`.
    pub fn fits(&self, kind: ValueKind) -> bool {
        matches!(
            (self, kind),
            (FieldValue::Null, _)
                | (FieldValue::Integer(_), ValueKind::Integer)
                | (FieldValue::Decimal(_), ValueKind::Decimal)
                | (FieldValue::Text(_), ValueKind::Text)
                | (FieldValue::Text(_), ValueKind::Enum(_))
                | (FieldValue::Date(_), ValueKind::Date)
                | (FieldValue::Bytes(_), ValueKind::Bytes)
        )
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(n: Option<i64>) -> Self {
        n.map(FieldValue::Integer).unwrap_or(FieldValue::Null)
    }
}

/// Column name to value. Ordered so storage and logs see a stable column order.
pub type Fields = BTreeMap<String, FieldValue>;

/// A stored row: its primary key plus every other column.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: i64,
    pub fields: Fields,
}

impl Record {
    pub fn get(&self, column: &str) -> &FieldValue {
        self.fields.get(column).unwrap_or(&FieldValue::Null)
    }

    /// Integer value of a column, `None` when null or absent.
    pub fn int(&self, column: &str) -> Option<i64> {
        self.get(column).as_i64()
    }

    pub fn set(&mut self, column: &str, value: impl Into<FieldValue>) {
        self.fields.insert(column.to_string(), value.into());
    }

    /// Overlay validated fields onto this record.
    pub fn apply(&mut self, fields: Fields) {
        self.fields.extend(fields);
    }

    /// JSON object with the primary key and every column, in schema order.
    pub fn to_json(&self, schema: &EntitySchema) -> Value {
        let mut out = Map::new();
        for c in schema.columns {
            let v = if c.name == schema.primary_key {
                Value::from(self.id)
            } else {
                self.get(c.name).to_json()
            };
            out.insert(c.name.to_string(), v);
        }
        Value::Object(out)
    }
}

pub fn records_to_json(schema: &EntitySchema, records: &[Record]) -> Value {
    Value::Array(records.iter().map(|r| r.to_json(schema)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog::{ALBUM, USER_PASSWORD};

    #[test]
    fn serializes_in_schema_order_with_nulls() {
        let mut r = Record {
            id: 7,
            fields: Fields::new(),
        };
        r.set("title", FieldValue::Text("Blue".into()));
        r.set("number_of_tracks", 12);
        r.set("number_of_discs", 1);
        r.set("release_date", NaiveDate::from_ymd_opt(1998, 1, 1).unwrap());
        let json = r.to_json(&ALBUM);
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            [
                "album_id",
                "title",
                "number_of_discs",
                "number_of_tracks",
                "release_date",
                "album_cover_id"
            ]
        );
        assert_eq!(json["album_id"], 7);
        assert_eq!(json["release_date"], "1998-01-01");
        assert!(json["album_cover_id"].is_null());
    }

    #[test]
    fn bytes_serialize_as_base64() {
        let mut r = Record {
            id: 1,
            fields: Fields::new(),
        };
        r.set("encrypted_password", FieldValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]));
        assert_eq!(r.to_json(&USER_PASSWORD)["encrypted_password"], "3q2+7w==");
    }

    #[test]
    fn null_fits_every_kind() {
        assert!(FieldValue::Null.fits(ValueKind::Date));
        assert!(FieldValue::Text("male".into()).fits(ValueKind::Enum(&["male"])));
        assert!(!FieldValue::Integer(3).fits(ValueKind::Text));
    }
}
