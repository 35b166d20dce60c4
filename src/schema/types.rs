//! Column and entity descriptors. Declared as constants; nothing here does I/O.

/// Value kind of one column. Drives validation, storage binding and DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Strictly positive integer.
    Integer,
    /// Strictly positive decimal.
    Decimal,
    /// Non-empty string.
    Text,
    /// Calendar date in `YYYY-MM-DD` form.
    Date,
    /// One of a fixed set of strings.
    Enum(&'static [&'static str]),
    /// Opaque bytes, base64 on the wire.
    Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ValueKind,
    pub nullable: bool,
}

impl Column {
    /// Primary key column: integer, never nullable, assigned by storage.
    pub const fn key(name: &'static str) -> Self {
        Column {
            name,
            kind: ValueKind::Integer,
            nullable: false,
        }
    }

    pub const fn required(name: &'static str, kind: ValueKind) -> Self {
        Column {
            name,
            kind,
            nullable: false,
        }
    }

    pub const fn optional(name: &'static str, kind: ValueKind) -> Self {
        Column {
            name,
            kind,
            nullable: true,
        }
    }
}

/// Everything the handlers, validator and stores need to know about one entity.
/// The primary key is always the first column.
#[derive(Debug)]
pub struct EntitySchema {
    /// Human label used in messages, e.g. `album` or `to-buy listing`.
    pub label: &'static str,
    pub table: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [Column],
    /// Column sets that must be unique across rows.
    pub unique: &'static [&'static [&'static str]],
}

impl EntitySchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Columns other than the primary key, in declaration order.
    pub fn data_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(move |c| c.name != self.primary_key)
    }

    /// Non-key columns that must be present when a record is created.
    pub fn required_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.data_columns().filter(|c| !c.nullable)
    }
}

/// Marker trait tying a zero-sized type to its schema, so handler factories can be generic over entities.
pub trait Entity: Send + Sync + 'static {
    const SCHEMA: &'static EntitySchema;
}
