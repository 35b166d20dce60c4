//! Endpoint handler factories. Each returns a [`MethodTable`](crate::dispatch::MethodTable) for one route.

pub mod accounts;
pub mod association;
pub mod lyrics;
pub mod resource;
pub mod tracks;
pub mod users;

use crate::error::AppError;
use crate::record::Record;
use crate::schema::EntitySchema;
use crate::store::Store;
use chrono::NaiveDate;

pub use accounts::{account_listing, account_listings, user_account, user_account_single, Account};
pub use association::{association_list, association_single};
pub use lyrics::{song_lyrics, song_lyrics_single};
pub use resource::{collection, single};
pub use tracks::{album_songs, song_album, song_albums};
pub use users::{password_authenticate, password_set};

/// Load a record or fail with `no {label} with {key}={id}`.
pub(crate) async fn fetch(store: &dyn Store, schema: &'static EntitySchema, id: i64) -> Result<Record, AppError> {
    store
        .get(schema, id)
        .await?
        .ok_or_else(|| AppError::no_such(schema.label, schema.primary_key, id))
}

/// `{outer} with {k}={v} not associated with {inner} with {k}={v}`
pub(crate) fn not_associated(
    outer: &EntitySchema,
    outer_id: i64,
    inner: &EntitySchema,
    inner_id: i64,
) -> AppError {
    AppError::NotFound(format!(
        "{} with {}={} not associated with {} with {}={}",
        outer.label, outer.primary_key, outer_id, inner.label, inner.primary_key, inner_id
    ))
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
