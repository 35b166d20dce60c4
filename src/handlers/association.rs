//! Many-to-many links through a bridge entity whose columns are named after both primary keys.
//!
//! `O` is the resource named first in the path, `I` the linked resource, `B` the bridge.

use super::{fetch, not_associated};
use crate::dispatch::{Call, HandlerFuture, MethodTable, Verb};
use crate::error::AppError;
use crate::record::{FieldValue, Record};
use crate::response::Reply;
use crate::schema::{Entity, EntitySchema};
use crate::service::{require_columns, validate_only};
use crate::store::Store;
use serde_json::Value;

/// GET lists linked records, POST links one.
pub fn association_list<O: Entity, I: Entity, B: Entity>() -> MethodTable {
    let (outer, inner) = (O::SCHEMA, I::SCHEMA);
    MethodTable::new()
        .on(
            Verb::Get,
            format!(
                "Returns a list of every {} associated with the {} with id :{}.",
                inner.label, outer.label, outer.primary_key
            ),
            list_linked::<O, I, B>,
        )
        .on(
            Verb::Post,
            format!(
                "Accepts a {} and associates that {} with the {} with id :{}.",
                inner.primary_key, inner.label, outer.label, outer.primary_key
            ),
            link::<O, I, B>,
        )
}

/// GET one linked record, DELETE the link.
pub fn association_single<O: Entity, I: Entity, B: Entity>() -> MethodTable {
    let (outer, inner) = (O::SCHEMA, I::SCHEMA);
    MethodTable::new()
        .on(
            Verb::Get,
            format!(
                "Returns the {} with id :{} associated with the {} with id :{}.",
                inner.label, inner.primary_key, outer.label, outer.primary_key
            ),
            read_linked::<O, I, B>,
        )
        .on(
            Verb::Delete,
            format!(
                "Disassociates the {} with id :{} from the {} with id :{}.",
                inner.label, inner.primary_key, outer.label, outer.primary_key
            ),
            unlink::<O, I, B>,
        )
}

fn describe(schema: &EntitySchema, id: i64) -> String {
    format!("{} with {}={}", schema.label, schema.primary_key, id)
}

/// Bridge rows for `outer`, paired with the linked record. Rows whose linked record is gone are skipped.
pub(crate) async fn linked_records(
    store: &dyn Store,
    outer: &'static EntitySchema,
    outer_id: i64,
    inner: &'static EntitySchema,
    bridge: &'static EntitySchema,
) -> Result<Vec<(Record, Record)>, AppError> {
    let rows = store
        .filter(bridge, &[(outer.primary_key, FieldValue::Integer(outer_id))])
        .await?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(inner_id) = row.int(inner.primary_key) else {
            continue;
        };
        match store.get(inner, inner_id).await? {
            Some(record) => out.push((row, record)),
            None => tracing::warn!(
                bridge = bridge.table,
                bridge_id = row.id,
                missing = %describe(inner, inner_id),
                "skipping link to missing record"
            ),
        }
    }
    Ok(out)
}

/// Outer record, inner record and the bridge row joining them; 404 at the first missing piece.
pub(crate) async fn resolve_link<O: Entity, I: Entity, B: Entity>(
    call: &Call,
) -> Result<(Record, Record, Record), AppError> {
    let store = call.store.as_ref();
    let outer = fetch(store, O::SCHEMA, call.id(0)?).await?;
    let inner = fetch(store, I::SCHEMA, call.id(1)?).await?;
    let bridge = store
        .first(
            B::SCHEMA,
            &[
                (O::SCHEMA.primary_key, FieldValue::Integer(outer.id)),
                (I::SCHEMA.primary_key, FieldValue::Integer(inner.id)),
            ],
        )
        .await?
        .ok_or_else(|| not_associated(O::SCHEMA, outer.id, I::SCHEMA, inner.id))?;
    Ok((outer, inner, bridge))
}

fn list_linked<O: Entity, I: Entity, B: Entity>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let store = call.store.as_ref();
        let outer = fetch(store, O::SCHEMA, call.id(0)?).await?;
        let linked = linked_records(store, O::SCHEMA, outer.id, I::SCHEMA, B::SCHEMA).await?;
        Ok(Reply::ok(Value::Array(
            linked
                .iter()
                .map(|(_, record)| record.to_json(I::SCHEMA))
                .collect(),
        )))
    })
}

fn link<O: Entity, I: Entity, B: Entity>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let store = call.store.as_ref();
        let outer = fetch(store, O::SCHEMA, call.id(0)?).await?;
        let outer_key = O::SCHEMA.primary_key;
        let inner_key = I::SCHEMA.primary_key;

        let input = call.json_object()?;
        let allowed: Vec<&str> = B::SCHEMA
            .data_columns()
            .map(|c| c.name)
            .filter(|name| *name != outer_key)
            .collect();
        let mut fields = validate_only(B::SCHEMA, &input, &allowed, false)?;
        fields.insert(outer_key.to_string(), FieldValue::Integer(outer.id));
        require_columns(B::SCHEMA, &fields)?;

        let inner_id = fields
            .get(inner_key)
            .and_then(FieldValue::as_i64)
            .ok_or_else(|| AppError::BadRequest(format!("{} must be set", inner_key)))?;
        let inner = fetch(store, I::SCHEMA, inner_id).await?;

        let pair = [
            (outer_key, FieldValue::Integer(outer.id)),
            (inner_key, FieldValue::Integer(inner.id)),
        ];
        if store.first(B::SCHEMA, &pair).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "association between {} and {} already exists",
                describe(O::SCHEMA, outer.id),
                describe(I::SCHEMA, inner.id)
            )));
        }
        for set in B::SCHEMA.unique {
            if set.len() == 2 && set.contains(&outer_key) && set.contains(&inner_key) {
                continue;
            }
            let filters: Vec<(&str, FieldValue)> = set
                .iter()
                .map(|c| (*c, fields.get(*c).cloned().unwrap_or(FieldValue::Null)))
                .collect();
            if filters.iter().any(|(_, v)| v.is_null()) {
                continue;
            }
            if store.first(B::SCHEMA, &filters).await?.is_some() {
                let taken: Vec<String> = filters.iter().map(|(c, v)| format!("{}={}", c, v)).collect();
                return Err(AppError::Conflict(format!(
                    "{} with {} already exists",
                    B::SCHEMA.label,
                    taken.join(", ")
                )));
            }
        }

        let row = store.create(B::SCHEMA, fields).await?;
        tracing::info!(
            bridge = B::SCHEMA.table,
            id = row.id,
            outer = %describe(O::SCHEMA, outer.id),
            inner = %describe(I::SCHEMA, inner.id),
            "linked"
        );
        Ok(Reply::created(inner.to_json(I::SCHEMA)))
    })
}

fn read_linked<O: Entity, I: Entity, B: Entity>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (_, inner, _) = resolve_link::<O, I, B>(&call).await?;
        Ok(Reply::ok(inner.to_json(I::SCHEMA)))
    })
}

fn unlink<O: Entity, I: Entity, B: Entity>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (outer, inner, bridge) = resolve_link::<O, I, B>(&call).await?;
        call.store.delete(B::SCHEMA, bridge.id).await?;
        Ok(Reply::message(format!(
            "association between {} and {} deleted",
            describe(O::SCHEMA, outer.id),
            describe(I::SCHEMA, inner.id)
        )))
    })
}
