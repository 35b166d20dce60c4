//! The catalog's route table. Every path maps to one method table; `/` lists them all.

use crate::dispatch::{Call, MethodTable};
use crate::error::AppError;
use crate::handlers::*;
use crate::response::Reply;
use crate::schema::catalog::*;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::Method,
    routing::any,
    Router,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Every catalog endpoint with its handlers, in listing order.
pub fn endpoints() -> Vec<(&'static str, MethodTable)> {
    vec![
        ("/albums", collection::<Album>()),
        ("/albums/:album_id", single::<Album>()),
        ("/albums/:album_id/songs", album_songs()),
        (
            "/albums/:album_id/songs/:song_id",
            association_single::<Album, Song, AlbumSongBridge>(),
        ),
        (
            "/albums/:album_id/genres",
            association_list::<Album, Genre, AlbumGenreBridge>(),
        ),
        (
            "/albums/:album_id/genres/:genre_id",
            association_single::<Album, Genre, AlbumGenreBridge>(),
        ),
        (
            "/albums/:album_id/artists",
            association_list::<Album, Artist, ArtistAlbumBridge>(),
        ),
        (
            "/albums/:album_id/artists/:artist_id",
            association_single::<Album, Artist, ArtistAlbumBridge>(),
        ),
        ("/artists", collection::<Artist>()),
        ("/artists/:artist_id", single::<Artist>()),
        (
            "/artists/:artist_id/albums",
            association_list::<Artist, Album, ArtistAlbumBridge>(),
        ),
        (
            "/artists/:artist_id/albums/:album_id",
            association_single::<Artist, Album, ArtistAlbumBridge>(),
        ),
        (
            "/artists/:artist_id/genres",
            association_list::<Artist, Genre, ArtistGenreBridge>(),
        ),
        (
            "/artists/:artist_id/genres/:genre_id",
            association_single::<Artist, Genre, ArtistGenreBridge>(),
        ),
        (
            "/artists/:artist_id/songs",
            association_list::<Artist, Song, ArtistSongBridge>(),
        ),
        (
            "/artists/:artist_id/songs/:song_id",
            association_single::<Artist, Song, ArtistSongBridge>(),
        ),
        ("/genres", collection::<Genre>()),
        ("/genres/:genre_id", single::<Genre>()),
        (
            "/genres/:genre_id/albums",
            association_list::<Genre, Album, AlbumGenreBridge>(),
        ),
        (
            "/genres/:genre_id/albums/:album_id",
            association_single::<Genre, Album, AlbumGenreBridge>(),
        ),
        (
            "/genres/:genre_id/artists",
            association_list::<Genre, Artist, ArtistGenreBridge>(),
        ),
        (
            "/genres/:genre_id/artists/:artist_id",
            association_single::<Genre, Artist, ArtistGenreBridge>(),
        ),
        (
            "/genres/:genre_id/songs",
            association_list::<Genre, Song, SongGenreBridge>(),
        ),
        (
            "/genres/:genre_id/songs/:song_id",
            association_single::<Genre, Song, SongGenreBridge>(),
        ),
        ("/songs", collection::<Song>()),
        ("/songs/:song_id", single::<Song>()),
        ("/songs/:song_id/albums", song_albums()),
        ("/songs/:song_id/albums/:album_id", song_album()),
        (
            "/songs/:song_id/artists",
            association_list::<Song, Artist, ArtistSongBridge>(),
        ),
        (
            "/songs/:song_id/artists/:artist_id",
            association_single::<Song, Artist, ArtistSongBridge>(),
        ),
        (
            "/songs/:song_id/genres",
            association_list::<Song, Genre, SongGenreBridge>(),
        ),
        (
            "/songs/:song_id/genres/:genre_id",
            association_single::<Song, Genre, SongGenreBridge>(),
        ),
        ("/songs/:song_id/lyrics", song_lyrics()),
        ("/songs/:song_id/lyrics/:song_lyrics_id", song_lyrics_single()),
        ("/users", collection::<User>()),
        ("/users/:user_id", single::<User>()),
        ("/users/:user_id/password", password_set()),
        ("/users/:user_id/password/authenticate", password_authenticate()),
        ("/users/:user_id/buyer_account", user_account::<BuyerAccount>()),
        (
            "/users/:user_id/buyer_account/:buyer_id",
            user_account_single::<BuyerAccount>(),
        ),
        (
            "/users/:user_id/buyer_account/:buyer_id/listings",
            account_listings::<BuyerAccount>(),
        ),
        (
            "/users/:user_id/buyer_account/:buyer_id/listings/:to_buy_listing_id",
            account_listing::<BuyerAccount>(),
        ),
        ("/users/:user_id/seller_account", user_account::<SellerAccount>()),
        (
            "/users/:user_id/seller_account/:seller_id",
            user_account_single::<SellerAccount>(),
        ),
        (
            "/users/:user_id/seller_account/:seller_id/listings",
            account_listings::<SellerAccount>(),
        ),
        (
            "/users/:user_id/seller_account/:seller_id/listings/:to_sell_listing_id",
            account_listing::<SellerAccount>(),
        ),
    ]
}

/// Path parameters in path order, each parsed as an integer id.
fn parse_ids(params: Option<Path<Vec<(String, String)>>>) -> Result<Vec<i64>, AppError> {
    let Some(Path(params)) = params else {
        return Ok(Vec::new());
    };
    params
        .into_iter()
        .map(|(name, raw)| {
            raw.parse::<i64>()
                .ok()
                .filter(|id| *id >= 0)
                .ok_or_else(|| AppError::BadRequest(format!("invalid {}: {}", name, raw)))
        })
        .collect()
}

async fn serve(
    table: Arc<MethodTable>,
    state: AppState,
    method: Method,
    params: Option<Path<Vec<(String, String)>>>,
    body: Bytes,
) -> Result<Reply, AppError> {
    let ids = parse_ids(params)?;
    tracing::debug!(%method, ?ids, "dispatch");
    let call = Call {
        store: state.store,
        ids,
        body,
    };
    table.dispatch(&method, call).await
}

/// All catalog routes plus the `/` endpoint index. Each path is also served with a trailing slash.
pub fn catalog_routes(state: AppState) -> Router {
    let mut router = Router::new();
    let mut index = Map::new();
    index.insert("/".into(), json!({ "GET": "Returns this endpoint index." }));
    for (path, table) in endpoints() {
        index.insert(path.to_string(), Value::Object(table.describe()));
        let table = Arc::new(table);
        let handler = any(
            move |State(state): State<AppState>,
                  method: Method,
                  params: Option<Path<Vec<(String, String)>>>,
                  body: Bytes| {
                let table = table.clone();
                async move { serve(table, state, method, params, body).await }
            },
        );
        router = router
            .route(path, handler.clone())
            .route(&format!("{}/", path), handler);
    }

    let index = Arc::new(json!({ "endpoints": Value::Object(index) }));
    router = router.route(
        "/",
        any(move |method: Method| {
            let index = index.clone();
            async move {
                if method == Method::GET {
                    Ok(Reply::ok((*index).clone()))
                } else {
                    Err(AppError::MethodNotSupported(method.to_string()))
                }
            }
        }),
    );
    router.with_state(state)
}
