//! Buyer and seller accounts hanging off a user, and the listings each account posts.
//!
//! One implementation serves both kinds through the [`Account`] trait. The account's primary key
//! doubles as the user's back-reference column and the listing's owner column.

use super::{fetch, not_associated, today};
use crate::dispatch::{Call, HandlerFuture, MethodTable, Verb};
use crate::error::AppError;
use crate::record::{records_to_json, FieldValue, Record};
use crate::response::Reply;
use crate::schema::catalog::{BuyerAccount, SellerAccount, ToBuyListing, ToSellListing, User};
use crate::schema::Entity;
use crate::service::{reject_primary_key, require_columns, validate_only, ValidationError};

pub trait Account: Entity {
    type Listing: Entity;
    /// `buyer` or `seller`, as used in messages.
    const KIND: &'static str;
    /// The one column a client may set when opening the account.
    const NAME_COLUMN: &'static str;
}

impl Account for BuyerAccount {
    type Listing = ToBuyListing;
    const KIND: &'static str = "buyer";
    const NAME_COLUMN: &'static str = "postboard_name";
}

impl Account for SellerAccount {
    type Listing = ToSellListing;
    const KIND: &'static str = "seller";
    const NAME_COLUMN: &'static str = "storefront_name";
}

/// `/users/:user_id/{kind}_account`
pub fn user_account<A: Account>() -> MethodTable {
    let label = A::SCHEMA.label;
    MethodTable::new()
        .on(
            Verb::Get,
            format!("Returns the {} of the user with id :user_id.", label),
            read_for_user::<A>,
        )
        .on(
            Verb::Post,
            format!("Opens a {} for the user with id :user_id.", label),
            open::<A>,
        )
}

/// `/users/:user_id/{kind}_account/:id`
pub fn user_account_single<A: Account>() -> MethodTable {
    let (label, key) = (A::SCHEMA.label, A::SCHEMA.primary_key);
    MethodTable::new()
        .on(
            Verb::Get,
            format!("Returns the {} with id :{} of the user with id :user_id.", label, key),
            read::<A>,
        )
        .on(
            Verb::Delete,
            format!("Closes the {} with id :{} of the user with id :user_id.", label, key),
            close::<A>,
        )
}

/// `/users/:user_id/{kind}_account/:id/listings`
pub fn account_listings<A: Account>() -> MethodTable {
    let (label, key) = (A::SCHEMA.label, A::SCHEMA.primary_key);
    let listing = <A::Listing as Entity>::SCHEMA.label;
    MethodTable::new()
        .on(
            Verb::Get,
            format!("Returns a list of every {} posted by the {} with id :{}.", listing, label, key),
            list_listings::<A>,
        )
        .on(
            Verb::Post,
            format!("Posts the submitted object as a new {} of the {} with id :{}.", listing, label, key),
            post_listing::<A>,
        )
}

/// `/users/:user_id/{kind}_account/:id/listings/:listing_id`
pub fn account_listing<A: Account>() -> MethodTable {
    let listing = <A::Listing as Entity>::SCHEMA;
    let (label, key) = (listing.label, listing.primary_key);
    MethodTable::new()
        .on(Verb::Get, format!("Returns the {} with id :{}.", label, key), read_listing::<A>)
        .on(
            Verb::Patch,
            format!("Updates the {} with id :{} according to the data submitted.", label, key),
            update_listing::<A>,
        )
        .on(Verb::Delete, format!("Deletes the {} with id :{}.", label, key), remove_listing::<A>)
}

fn account_key<A: Account>() -> &'static str {
    A::SCHEMA.primary_key
}

fn read_for_user<A: Account>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let store = call.store.as_ref();
        let user = fetch(store, User::SCHEMA, call.id(0)?).await?;
        let account_id = user.int(account_key::<A>()).ok_or_else(|| {
            AppError::NotFound(format!(
                "user with user_id={} has no associated {} account",
                user.id,
                A::KIND
            ))
        })?;
        let account = fetch(store, A::SCHEMA, account_id).await?;
        Ok(Reply::ok(account.to_json(A::SCHEMA)))
    })
}

fn open<A: Account>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let store = call.store.as_ref();
        let key = account_key::<A>();
        let user = fetch(store, User::SCHEMA, call.id(0)?).await?;
        if let Some(existing) = user.int(key) {
            return Err(AppError::Conflict(format!(
                "user with user_id={} already has a {} account with {}={} associated",
                user.id,
                A::KIND,
                key,
                existing
            )));
        }
        let input = call.json_object()?;
        let mut fields = validate_only(A::SCHEMA, &input, &[A::NAME_COLUMN], false)?;
        fields.insert("date_created".into(), FieldValue::Date(today()));
        fields.insert("user_id".into(), FieldValue::Integer(user.id));
        let (account, user) = store
            .create_linked(A::SCHEMA, fields, User::SCHEMA, &user, key)
            .await?;
        tracing::info!(user_id = user.id, kind = A::KIND, account_id = account.id, "account opened");
        Ok(Reply::created(account.to_json(A::SCHEMA)))
    })
}

/// User and account from the path, 404 unless the account belongs to the user.
async fn resolve_account<A: Account>(call: &Call) -> Result<(Record, Record), AppError> {
    let store = call.store.as_ref();
    let user = fetch(store, User::SCHEMA, call.id(0)?).await?;
    let account = fetch(store, A::SCHEMA, call.id(1)?).await?;
    if account.int("user_id") != Some(user.id) {
        return Err(not_associated(User::SCHEMA, user.id, A::SCHEMA, account.id));
    }
    Ok((user, account))
}

/// Account and listing from the path, 404 unless the chain user, account, listing holds.
async fn resolve_listing<A: Account>(call: &Call) -> Result<(Record, Record), AppError> {
    let (_, account) = resolve_account::<A>(call).await?;
    let listing = fetch(call.store.as_ref(), <A::Listing as Entity>::SCHEMA, call.id(2)?).await?;
    if listing.int(account_key::<A>()) != Some(account.id) {
        return Err(not_associated(
            A::SCHEMA,
            account.id,
            <A::Listing as Entity>::SCHEMA,
            listing.id,
        ));
    }
    Ok((account, listing))
}

fn read<A: Account>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (_, account) = resolve_account::<A>(&call).await?;
        Ok(Reply::ok(account.to_json(A::SCHEMA)))
    })
}

fn close<A: Account>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (mut user, account) = resolve_account::<A>(&call).await?;
        let key = account_key::<A>();
        if user.int(key) == Some(account.id) {
            user.set(key, FieldValue::Null);
            call.store.save(User::SCHEMA, &user).await?;
        }
        call.store.delete(A::SCHEMA, account.id).await?;
        tracing::info!(user_id = user.id, kind = A::KIND, account_id = account.id, "account closed");
        Ok(Reply::message(format!(
            "{} account with {}={} associated with user with user_id={} disassociated and deleted",
            A::KIND,
            key,
            account.id,
            user.id
        )))
    })
}

fn list_listings<A: Account>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (_, account) = resolve_account::<A>(&call).await?;
        let schema = <A::Listing as Entity>::SCHEMA;
        let listings = call
            .store
            .filter(schema, &[(account_key::<A>(), FieldValue::Integer(account.id))])
            .await?;
        Ok(Reply::ok(records_to_json(schema, &listings)))
    })
}

/// Listing columns a client may write: everything but the owner column.
fn writable_listing_columns<A: Account>() -> Vec<&'static str> {
    let key = account_key::<A>();
    <A::Listing as Entity>::SCHEMA
        .columns
        .iter()
        .map(|c| c.name)
        .filter(|name| *name != key)
        .collect()
}

fn post_listing<A: Account>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (_, account) = resolve_account::<A>(&call).await?;
        let schema = <A::Listing as Entity>::SCHEMA;
        let input = call.json_object()?;
        let mut fields = validate_only(schema, &input, &writable_listing_columns::<A>(), false)?;
        reject_primary_key(schema, &fields)?;
        require_columns(schema, &fields)?;
        if fields.get("date_posted").map_or(true, FieldValue::is_null) {
            fields.insert("date_posted".into(), FieldValue::Date(today()));
        }
        fields.insert(account_key::<A>().into(), FieldValue::Integer(account.id));
        let listing = call.store.create(schema, fields).await?;
        tracing::info!(kind = A::KIND, account_id = account.id, listing_id = listing.id, "listing posted");
        Ok(Reply::created(listing.to_json(schema)))
    })
}

fn read_listing<A: Account>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (_, listing) = resolve_listing::<A>(&call).await?;
        Ok(Reply::ok(listing.to_json(<A::Listing as Entity>::SCHEMA)))
    })
}

fn update_listing<A: Account>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (_, mut listing) = resolve_listing::<A>(&call).await?;
        let schema = <A::Listing as Entity>::SCHEMA;
        let input = call.json_object()?;
        if input.is_empty() {
            return Err(ValidationError::EmptyObject.into());
        }
        let fields = validate_only(schema, &input, &writable_listing_columns::<A>(), true)?;
        reject_primary_key(schema, &fields)?;
        listing.apply(fields);
        call.store.save(schema, &listing).await?;
        Ok(Reply::ok(listing.to_json(schema)))
    })
}

fn remove_listing<A: Account>(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (_, listing) = resolve_listing::<A>(&call).await?;
        let schema = <A::Listing as Entity>::SCHEMA;
        call.store.delete(schema, listing.id).await?;
        Ok(Reply::message(format!(
            "{} with {}={} deleted",
            schema.label, schema.primary_key, listing.id
        )))
    })
}
