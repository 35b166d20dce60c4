//! Generic collection and single-resource CRUD.

use super::fetch;
use crate::dispatch::{Call, HandlerFuture, MethodTable, Verb};
use crate::record::records_to_json;
use crate::response::Reply;
use crate::schema::Entity;
use crate::service::{validate_new, validate_update};

/// GET lists every record, POST creates one.
pub fn collection<E: Entity>() -> MethodTable {
    let label = E::SCHEMA.label;
    MethodTable::new()
        .on(Verb::Get, format!("Returns a list of every {}.", label), list::<E>)
        .on(Verb::Post, format!("Adds the submitted object as a new {}.", label), create::<E>)
}

/// GET, PATCH and DELETE one record by primary key.
pub fn single<E: Entity>() -> MethodTable {
    let (label, key) = (E::SCHEMA.label, E::SCHEMA.primary_key);
    MethodTable::new()
        .on(Verb::Get, format!("Returns the {} with id :{}.", label, key), read::<E>)
        .on(
            Verb::Patch,
            format!("Updates the {} with id :{} according to the data submitted.", label, key),
            update::<E>,
        )
        .on(Verb::Delete, format!("Deletes the {} with id :{}.", label, key), remove::<E>)
}

fn list<E: Entity>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let records = call.store.all(E::SCHEMA).await?;
        Ok(Reply::ok(records_to_json(E::SCHEMA, &records)))
    })
}

fn create<E: Entity>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let input = call.json_object()?;
        let fields = validate_new(E::SCHEMA, &input)?;
        let record = call.store.create(E::SCHEMA, fields).await?;
        tracing::info!(entity = E::SCHEMA.label, id = record.id, "created");
        Ok(Reply::created(record.to_json(E::SCHEMA)))
    })
}

fn read<E: Entity>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let record = fetch(call.store.as_ref(), E::SCHEMA, call.id(0)?).await?;
        Ok(Reply::ok(record.to_json(E::SCHEMA)))
    })
}

fn update<E: Entity>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let mut record = fetch(call.store.as_ref(), E::SCHEMA, call.id(0)?).await?;
        let input = call.json_object()?;
        let fields = validate_update(E::SCHEMA, &input)?;
        record.apply(fields);
        call.store.save(E::SCHEMA, &record).await?;
        tracing::info!(entity = E::SCHEMA.label, id = record.id, "updated");
        Ok(Reply::ok(record.to_json(E::SCHEMA)))
    })
}

fn remove<E: Entity>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let schema = E::SCHEMA;
        let record = fetch(call.store.as_ref(), schema, call.id(0)?).await?;
        call.store.delete(schema, record.id).await?;
        tracing::info!(entity = schema.label, id = record.id, "deleted");
        Ok(Reply::message(format!(
            "{} with {}={} deleted",
            schema.label, schema.primary_key, record.id
        )))
    })
}
