//! Schema-driven input validation: raw JSON properties in, typed fields out.

use crate::record::{FieldValue, Fields};
use crate::schema::{EntitySchema, ValueKind};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unexpected {} in input: {}", property_noun(.0.len()), quoted_list(.0))]
    UnexpectedProperties(Vec<String>),
    #[error("json object missing required {}: {}", property_noun(.0.len()), quoted_list(.0))]
    MissingProperties(Vec<String>),
    #[error("value for '{0}' can't be set: column is the primary key")]
    PrimaryKeySet(String),
    #[error("empty JSON object")]
    EmptyObject,
    #[error("value for '{0}' is null and column not nullable")]
    NotNullable(String),
    #[error("value for '{column}' isn't an integer: {value}")]
    NotInteger { column: String, value: String },
    #[error("value for '{column}' isn't a decimal: {value}")]
    NotDecimal { column: String, value: String },
    #[error("value for '{column}' isn't greater than 0: {value}")]
    NotPositive { column: String, value: String },
    #[error("value for '{column}' isn't a string: {value}")]
    NotString { column: String, value: String },
    #[error("value for '{0}' is a string of zero length")]
    EmptyString(String),
    #[error("value for '{0}' isn't in format YYYY-MM-DD and column is a DATE")]
    NotDate(String),
    #[error("value for '{column}' not one of {} and column is an ENUM type", options_list(.options))]
    NotEnumMember {
        column: String,
        options: &'static [&'static str],
    },
    #[error("value for '{0}' isn't base64-encoded binary data")]
    NotBase64(String),
}

fn property_noun(n: usize) -> &'static str {
    if n > 1 {
        "properties"
    } else {
        "property"
    }
}

fn quoted_list(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `'a', 'b' or 'c'`
fn options_list(options: &[&str]) -> String {
    let quoted: Vec<String> = options.iter().map(|o| format!("'{}'", o)).collect();
    match quoted.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {}", rest.join(", "), last),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

/// Render a JSON value the way messages quote user input: strings bare, everything else as JSON.
fn shown(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_iso_date(s: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(s))
}

/// Validate every property of `input` against `schema`.
/// With `allow_all_nullable` any column may be set to null (partial updates).
pub fn validate(
    schema: &EntitySchema,
    input: &Map<String, Value>,
    allow_all_nullable: bool,
) -> Result<Fields, ValidationError> {
    let allowed: Vec<&str> = schema.columns.iter().map(|c| c.name).collect();
    validate_only(schema, input, &allowed, allow_all_nullable)
}

/// Like [`validate`], but only the columns in `allowed` may appear in the input.
pub fn validate_only(
    schema: &EntitySchema,
    input: &Map<String, Value>,
    allowed: &[&str],
    allow_all_nullable: bool,
) -> Result<Fields, ValidationError> {
    let mut unexpected: Vec<String> = input
        .keys()
        .filter(|k| !allowed.contains(&k.as_str()) || !schema.has_column(k))
        .cloned()
        .collect();
    if !unexpected.is_empty() {
        unexpected.sort();
        return Err(ValidationError::UnexpectedProperties(unexpected));
    }

    let mut out = Fields::new();
    for (name, value) in input {
        let Some(column) = schema.column(name) else {
            continue;
        };
        let typed = if value.is_null() {
            if !(allow_all_nullable || column.nullable) {
                return Err(ValidationError::NotNullable(name.clone()));
            }
            FieldValue::Null
        } else {
            coerce(name, column.kind, value)?
        };
        out.insert(name.clone(), typed);
    }
    Ok(out)
}

fn coerce(column: &str, kind: ValueKind, value: &Value) -> Result<FieldValue, ValidationError> {
    match kind {
        ValueKind::Integer => {
            let n = as_integer(value).ok_or_else(|| ValidationError::NotInteger {
                column: column.to_string(),
                value: shown(value),
            })?;
            if n <= 0 {
                return Err(ValidationError::NotPositive {
                    column: column.to_string(),
                    value: n.to_string(),
                });
            }
            Ok(FieldValue::Integer(n))
        }
        ValueKind::Decimal => {
            let f = as_decimal(value).ok_or_else(|| ValidationError::NotDecimal {
                column: column.to_string(),
                value: shown(value),
            })?;
            if f <= 0.0 {
                return Err(ValidationError::NotPositive {
                    column: column.to_string(),
                    value: shown(value),
                });
            }
            Ok(FieldValue::Decimal(f))
        }
        ValueKind::Text => {
            let s = value.as_str().ok_or_else(|| ValidationError::NotString {
                column: column.to_string(),
                value: shown(value),
            })?;
            if s.is_empty() {
                return Err(ValidationError::EmptyString(column.to_string()));
            }
            Ok(FieldValue::Text(s.to_string()))
        }
        ValueKind::Date => value
            .as_str()
            .filter(|s| is_iso_date(s))
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .map(FieldValue::Date)
            .ok_or_else(|| ValidationError::NotDate(column.to_string())),
        ValueKind::Enum(options) => match value.as_str() {
            Some(s) if options.iter().any(|o| *o == s) => Ok(FieldValue::Text(s.to_string())),
            _ => Err(ValidationError::NotEnumMember {
                column: column.to_string(),
                options,
            }),
        },
        ValueKind::Bytes => value
            .as_str()
            .and_then(|s| BASE64.decode(s).ok())
            .map(FieldValue::Bytes)
            .ok_or_else(|| ValidationError::NotBase64(column.to_string())),
    }
}

/// Integers, integral floats and integer strings are accepted; booleans are not.
fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_decimal(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    f.is_finite().then_some(f)
}

/// Fail when any non-nullable, non-key column is absent from `fields`.
pub fn require_columns(schema: &EntitySchema, fields: &Fields) -> Result<(), ValidationError> {
    let missing: Vec<String> = schema
        .required_columns()
        .filter(|c| !fields.contains_key(c.name))
        .map(|c| c.name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingProperties(missing))
    }
}

pub fn reject_primary_key(schema: &EntitySchema, fields: &Fields) -> Result<(), ValidationError> {
    if fields.contains_key(schema.primary_key) {
        return Err(ValidationError::PrimaryKeySet(schema.primary_key.to_string()));
    }
    Ok(())
}

/// Input for a new record: every property validated, no primary key, all required columns present.
pub fn validate_new(schema: &EntitySchema, input: &Map<String, Value>) -> Result<Fields, ValidationError> {
    let fields = validate(schema, input, false)?;
    reject_primary_key(schema, &fields)?;
    require_columns(schema, &fields)?;
    Ok(fields)
}

/// Input for a partial update: non-empty, any column may be nulled, no primary key.
pub fn validate_update(schema: &EntitySchema, input: &Map<String, Value>) -> Result<Fields, ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::EmptyObject);
    }
    let fields = validate(schema, input, true)?;
    reject_primary_key(schema, &fields)?;
    Ok(fields)
}
