//! Song lyrics: at most one lyrics record per song, linked both ways.

use super::{fetch, not_associated};
use crate::dispatch::{Call, HandlerFuture, MethodTable, Verb};
use crate::error::AppError;
use crate::record::{FieldValue, Record};
use crate::response::Reply;
use crate::schema::catalog::{Song, SongLyrics};
use crate::schema::Entity;
use crate::service::{require_columns, validate_only};

/// `/songs/:song_id/lyrics`
pub fn song_lyrics() -> MethodTable {
    MethodTable::new()
        .on(Verb::Get, "Returns the lyrics of the song with id :song_id.", read_for_song)
        .on(
            Verb::Post,
            "Adds the submitted lyrics to the song with id :song_id.",
            create,
        )
}

/// `/songs/:song_id/lyrics/:song_lyrics_id`
pub fn song_lyrics_single() -> MethodTable {
    MethodTable::new()
        .on(
            Verb::Get,
            "Returns the song lyrics with id :song_lyrics_id of the song with id :song_id.",
            read,
        )
        .on(
            Verb::Delete,
            "Deletes the song lyrics with id :song_lyrics_id of the song with id :song_id.",
            remove,
        )
}

fn read_for_song(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let store = call.store.as_ref();
        let song = fetch(store, Song::SCHEMA, call.id(0)?).await?;
        let lyrics_id = song.int("song_lyrics_id").ok_or_else(|| {
            AppError::NotFound(format!(
                "no song lyrics associated with song with song_id={}",
                song.id
            ))
        })?;
        let lyrics = fetch(store, SongLyrics::SCHEMA, lyrics_id).await?;
        Ok(Reply::ok(lyrics.to_json(SongLyrics::SCHEMA)))
    })
}

fn create(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let store = call.store.as_ref();
        let song = fetch(store, Song::SCHEMA, call.id(0)?).await?;
        if let Some(existing) = song.int("song_lyrics_id") {
            return Err(AppError::Conflict(format!(
                "song with song_id={} already has song lyrics with song_lyrics_id={} associated with it",
                song.id, existing
            )));
        }
        let input = call.json_object()?;
        let mut fields = validate_only(SongLyrics::SCHEMA, &input, &["lyrics"], false)?;
        require_columns(SongLyrics::SCHEMA, &fields)?;
        fields.insert("song_id".into(), FieldValue::Integer(song.id));
        let (lyrics, song) = store
            .create_linked(SongLyrics::SCHEMA, fields, Song::SCHEMA, &song, "song_lyrics_id")
            .await?;
        tracing::info!(song_id = song.id, song_lyrics_id = lyrics.id, "lyrics added");
        Ok(Reply::created(lyrics.to_json(SongLyrics::SCHEMA)))
    })
}

/// Song and lyrics from the path, 404 unless they belong together.
async fn resolve(call: &Call) -> Result<(Record, Record), AppError> {
    let store = call.store.as_ref();
    let song = fetch(store, Song::SCHEMA, call.id(0)?).await?;
    let lyrics = fetch(store, SongLyrics::SCHEMA, call.id(1)?).await?;
    if lyrics.int("song_id") != Some(song.id) {
        return Err(not_associated(Song::SCHEMA, song.id, SongLyrics::SCHEMA, lyrics.id));
    }
    Ok((song, lyrics))
}

fn read(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (_, lyrics) = resolve(&call).await?;
        Ok(Reply::ok(lyrics.to_json(SongLyrics::SCHEMA)))
    })
}

fn remove(call: Call) -> HandlerFuture {
    Box::pin(async move {
        let (mut song, lyrics) = resolve(&call).await?;
        song.set("song_lyrics_id", FieldValue::Null);
        call.store.save(Song::SCHEMA, &song).await?;
        call.store.delete(SongLyrics::SCHEMA, lyrics.id).await?;
        Ok(Reply::message(format!(
            "song lyrics with song_lyrics_id={} associated with song with song_id={} deleted",
            lyrics.id, song.id
        )))
    })
}
