//! Album track listings and song placements, both read through the album/song bridge.

use super::association::{association_list, association_single, linked_records, resolve_link};
use super::fetch;
use crate::dispatch::{Call, HandlerFuture, MethodTable, Verb};
use crate::record::Record;
use crate::response::Reply;
use crate::schema::catalog::{Album, AlbumSongBridge, Song};
use crate::schema::Entity;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// `/albums/:album_id/songs`: GET is the disc and track listing, POST places a song.
pub fn album_songs() -> MethodTable {
    association_list::<Album, Song, AlbumSongBridge>().on(
        Verb::Get,
        "Returns the songs on the album with id :album_id, grouped by disc and track.",
        track_listing,
    )
}

/// `/songs/:song_id/albums`: GET lists every placement of the song, POST places it on an album.
pub fn song_albums() -> MethodTable {
    association_list::<Song, Album, AlbumSongBridge>().on(
        Verb::Get,
        "Returns every album the song with id :song_id appears on, with its disc and track number.",
        placements,
    )
}

/// `/songs/:song_id/albums/:album_id`: GET is the placement, DELETE removes it.
pub fn song_album() -> MethodTable {
    association_single::<Song, Album, AlbumSongBridge>().on(
        Verb::Get,
        "Returns the disc and track number of the song with id :song_id on the album with id :album_id.",
        placement,
    )
}

fn position(bridge: &Record) -> (i64, i64) {
    (
        bridge.int("disc_number").unwrap_or_default(),
        bridge.int("track_number").unwrap_or_default(),
    )
}

fn placement_json(bridge: &Record, album: &Record) -> Value {
    let (disc, track) = position(bridge);
    json!({
        "disc_number": disc,
        "track_number": track,
        "album": album.to_json(Album::SCHEMA),
    })
}

/// `{"disc_1": {"track_1": song, ...}, ...}`, discs and tracks ascending.
fn track_listing(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let store = call.store.as_ref();
        let album = fetch(store, Album::SCHEMA, call.id(0)?).await?;
        let linked = linked_records(store, Album::SCHEMA, album.id, Song::SCHEMA, AlbumSongBridge::SCHEMA).await?;

        let mut discs: BTreeMap<i64, BTreeMap<i64, Value>> = BTreeMap::new();
        for (bridge, song) in &linked {
            let (disc, track) = position(bridge);
            discs
                .entry(disc)
                .or_default()
                .insert(track, song.to_json(Song::SCHEMA));
        }
        let listing: Map<String, Value> = discs
            .into_iter()
            .map(|(disc, tracks)| {
                let tracks: Map<String, Value> = tracks
                    .into_iter()
                    .map(|(track, song)| (format!("track_{}", track), song))
                    .collect();
                (format!("disc_{}", disc), Value::Object(tracks))
            })
            .collect();
        Ok(Reply::ok(Value::Object(listing)))
    })
}

fn placements(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let store = call.store.as_ref();
        let song = fetch(store, Song::SCHEMA, call.id(0)?).await?;
        let linked = linked_records(store, Song::SCHEMA, song.id, Album::SCHEMA, AlbumSongBridge::SCHEMA).await?;
        Ok(Reply::ok(Value::Array(
            linked
                .iter()
                .map(|(bridge, album)| placement_json(bridge, album))
                .collect(),
        )))
    })
}

fn placement(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (_, album, bridge) = resolve_link::<Song, Album, AlbumSongBridge>(&call).await?;
        Ok(Reply::ok(placement_json(&bridge, &album)))
    })
}
