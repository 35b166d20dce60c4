//! User password endpoints.

use super::fetch;
use crate::dispatch::{Call, HandlerFuture, MethodTable, Verb};
use crate::error::AppError;
use crate::record::{FieldValue, Fields};
use crate::response::Reply;
use crate::schema::catalog::{User, UserPassword};
use crate::schema::{Column, Entity, EntitySchema, ValueKind};
use crate::service::{hash_password, require_columns, validate_only, verify_password};
use serde_json::json;

/// Typing for password request bodies. Only `password` is accepted, so the key column never shows.
const PASSWORD_INPUT: EntitySchema = EntitySchema {
    label: "password",
    table: "password_input",
    primary_key: "password_input_id",
    columns: &[
        Column::key("password_input_id"),
        Column::required("password", ValueKind::Text),
    ],
    unique: &[],
};

/// `/users/:user_id/password`
pub fn password_set() -> MethodTable {
    MethodTable::new().on(
        Verb::Post,
        "Sets the password of the user with id :user_id.",
        set_password,
    )
}

/// `/users/:user_id/password/authenticate`
pub fn password_authenticate() -> MethodTable {
    MethodTable::new().on(
        Verb::Post,
        "Checks the submitted password against the one set for the user with id :user_id.",
        authenticate,
    )
}

/// The user id from the path and the submitted password.
async fn password_input(call: &Call) -> Result<(i64, String), AppError> {
    let user = fetch(call.store.as_ref(), User::SCHEMA, call.id(0)?).await?;
    let input = call.json_object()?;
    let fields = validate_only(&PASSWORD_INPUT, &input, &["password"], false)?;
    require_columns(&PASSWORD_INPUT, &fields)?;
    match fields.get("password") {
        Some(FieldValue::Text(password)) => Ok((user.id, password.clone())),
        _ => Err(AppError::BadRequest("password must be a string".into())),
    }
}

fn set_password(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (user_id, password) = password_input(&call).await?;
        // bcrypt is CPU-bound; run it off the async workers.
        let digest = tokio::task::spawn_blocking(move || hash_password(&password)).await??;
        let digest = FieldValue::Bytes(digest);
        let store = call.store.as_ref();
        let owner = [("user_id", FieldValue::Integer(user_id))];
        let record = match store.first(UserPassword::SCHEMA, &owner).await? {
            Some(mut existing) => {
                existing.set("encrypted_password", digest);
                store.save(UserPassword::SCHEMA, &existing).await?;
                existing
            }
            None => {
                let mut fields = Fields::new();
                fields.insert("encrypted_password".into(), digest);
                fields.insert("user_id".into(), FieldValue::Integer(user_id));
                store.create(UserPassword::SCHEMA, fields).await?
            }
        };
        tracing::info!(user_id, "password set");
        Ok(Reply::ok(record.to_json(UserPassword::SCHEMA)))
    })
}

fn authenticate(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (user_id, password) = password_input(&call).await?;
        let owner = [("user_id", FieldValue::Integer(user_id))];
        let stored = call
            .store
            .first(UserPassword::SCHEMA, &owner)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("user with user_id={} has no password set", user_id))
            })?;
        let digest = stored
            .get("encrypted_password")
            .as_bytes()
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
        let authenticates =
            tokio::task::spawn_blocking(move || verify_password(&password, &digest)).await?;
        Ok(Reply::ok(json!({ "authenticates": authenticates })))
    })
}
