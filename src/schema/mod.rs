//! Entity schemas: column kinds, nullability, keys and unique sets.

pub mod catalog;
mod types;

pub use types::{Column, Entity, EntitySchema, ValueKind};
