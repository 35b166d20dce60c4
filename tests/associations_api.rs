//! Bridge-table endpoints: links between albums, artists, genres and songs, plus lyrics.

mod common;

use common::{message, spawn};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn album_genre_links() {
    let server = spawn().await;
    let album = server.album("Blue").await;
    let rock = server.genre("Rock").await;
    let jazz = server.genre("Jazz").await;
    let genres = format!("/albums/{}/genres", album);

    let (status, list) = server.get(&genres).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));

    let (status, linked) = server.post(&genres, json!({ "genre_id": jazz })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(linked, json!({"genre_id": jazz, "genre_name": "Jazz"}));
    server.post(&genres, json!({ "genre_id": rock })).await;

    let (status, body) = server.post(&genres, json!({ "genre_id": jazz })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        message(&body),
        format!(
            "association between album with album_id={} and genre with genre_id={} already exists",
            album, jazz
        )
    );

    let (_, list) = server.get(&genres).await;
    let names: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["genre_name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Jazz", "Rock"]);

    // The same bridge read from the genre's side.
    let (_, albums) = server.get(&format!("/genres/{}/albums", jazz)).await;
    assert_eq!(albums[0]["album_id"], album);

    let one = format!("/albums/{}/genres/{}", album, jazz);
    let (status, genre) = server.get(&one).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(genre["genre_name"], "Jazz");

    let (status, body) = server.delete(&one).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        message(&body),
        format!(
            "association between album with album_id={} and genre with genre_id={} deleted",
            album, jazz
        )
    );

    let (status, body) = server.get(&one).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        message(&body),
        format!(
            "album with album_id={} not associated with genre with genre_id={}",
            album, jazz
        )
    );

    // Unlinking leaves the genre itself alone.
    let (status, _) = server.get(&format!("/genres/{}", jazz)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn link_requires_existing_records_and_known_keys() {
    let server = spawn().await;
    let album = server.album("Blue").await;
    let genres = format!("/albums/{}/genres", album);

    let (status, body) = server.post(&genres, json!({"genre_id": 42})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "no genre with genre_id=42");

    let (status, body) = server.post("/albums/77/genres", json!({"genre_id": 1})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "no album with album_id=77");

    let (status, body) = server.get("/albums/77/genres").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "no album with album_id=77");

    let (status, body) = server
        .post(&genres, json!({"genre_id": 1, "album_id": album}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "unexpected property in input: 'album_id'");

    let (status, body) = server.post(&genres, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "json object missing required property: 'genre_id'");

    let (status, body) = server.get(&format!("/albums/{}/genres/5", album)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "no genre with genre_id=5");
}

#[tokio::test]
async fn artist_links_read_from_both_sides() {
    let server = spawn().await;
    let album = server.album("Pastel Blues").await;
    let artist = server.artist("Nina", "Simone").await;

    let (status, _) = server
        .post(&format!("/artists/{}/albums", artist), json!({ "album_id": album }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, artists) = server.get(&format!("/albums/{}/artists", album)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(artists[0]["last_name"], "Simone");

    let (status, _) = server
        .post(&format!("/albums/{}/artists", album), json!({ "artist_id": artist }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn album_track_listing_groups_by_disc_and_track() {
    let server = spawn().await;
    let album = server.album("Double").await;
    let songs = format!("/albums/{}/songs", album);
    let opener = server.song("Opener").await;
    let second = server.song("Second").await;
    let closer = server.song("Closer").await;

    for (song, disc, track) in [(closer, 2, 1), (second, 1, 2), (opener, 1, 1)] {
        let (status, placed) = server
            .post(
                &songs,
                json!({"song_id": song, "disc_number": disc, "track_number": track}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(placed["song_id"], song);
    }

    let (status, listing) = server.get(&songs).await;
    assert_eq!(status, StatusCode::OK);
    let discs: Vec<_> = listing.as_object().unwrap().keys().cloned().collect();
    assert_eq!(discs, ["disc_1", "disc_2"]);
    let tracks: Vec<_> = listing["disc_1"].as_object().unwrap().keys().cloned().collect();
    assert_eq!(tracks, ["track_1", "track_2"]);
    assert_eq!(listing["disc_1"]["track_1"]["title"], "Opener");
    assert_eq!(listing["disc_1"]["track_2"]["title"], "Second");
    assert_eq!(listing["disc_2"]["track_1"]["title"], "Closer");

    let (status, body) = server
        .post(&songs, json!({"song_id": opener, "disc_number": 2, "track_number": 5}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(message(&body).ends_with("already exists"));

    let spare = server.song("Spare").await;
    let (status, body) = server
        .post(&songs, json!({"song_id": spare, "disc_number": 1, "track_number": 1}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        message(&body),
        format!(
            "album track with album_id={}, disc_number=1, track_number=1 already exists",
            album
        )
    );

    let (status, body) = server.post(&songs, json!({ "song_id": spare })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        message(&body),
        "json object missing required properties: 'disc_number', 'track_number'"
    );
}

#[tokio::test]
async fn song_placements_on_albums() {
    let server = spawn().await;
    let album = server.album("Live").await;
    let song = server.song("Encore").await;
    server
        .post(
            &format!("/albums/{}/songs", album),
            json!({"song_id": song, "disc_number": 1, "track_number": 9}),
        )
        .await;

    let (status, placements) = server.get(&format!("/songs/{}/albums", song)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(placements.as_array().unwrap().len(), 1);
    assert_eq!(placements[0]["disc_number"], 1);
    assert_eq!(placements[0]["track_number"], 9);
    assert_eq!(placements[0]["album"]["title"], "Live");

    let one = format!("/songs/{}/albums/{}", song, album);
    let (status, placement) = server.get(&one).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(placement, placements[0]);

    let (status, _) = server.delete(&one).await;
    assert_eq!(status, StatusCode::OK);
    let (_, listing) = server.get(&format!("/albums/{}/songs", album)).await;
    assert_eq!(listing, json!({}));
}

#[tokio::test]
async fn deleted_records_drop_out_of_listings() {
    let server = spawn().await;
    let album = server.album("Gone").await;
    let song = server.song("Lost").await;
    let kept = server.song("Kept").await;
    let songs = format!("/albums/{}/songs", album);
    server
        .post(&songs, json!({"song_id": song, "disc_number": 1, "track_number": 1}))
        .await;
    server
        .post(&songs, json!({"song_id": kept, "disc_number": 1, "track_number": 2}))
        .await;

    let (status, _) = server.delete(&format!("/songs/{}", song)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, listing) = server.get(&songs).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["disc_1"].as_object().unwrap().len(), 1);
    assert_eq!(listing["disc_1"]["track_2"]["title"], "Kept");
}

#[tokio::test]
async fn song_lyrics_lifecycle() {
    let server = spawn().await;
    let song = server.song("Ballad").await;
    let lyrics = format!("/songs/{}/lyrics", song);

    let (status, body) = server.get(&lyrics).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        message(&body),
        format!("no song lyrics associated with song with song_id={}", song)
    );

    let (status, body) = server.post(&lyrics, json!({"lyrics": "la la", "song_id": 3})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "unexpected property in input: 'song_id'");

    let (status, created) = server.post(&lyrics, json!({"lyrics": "la la"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let lyrics_id = created["song_lyrics_id"].as_i64().unwrap();
    assert_eq!(created["song_id"], song);

    let (_, song_json) = server.get(&format!("/songs/{}", song)).await;
    assert_eq!(song_json["song_lyrics_id"], lyrics_id);

    let (status, body) = server.post(&lyrics, json!({"lyrics": "again"})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        message(&body),
        format!(
            "song with song_id={} already has song lyrics with song_lyrics_id={} associated with it",
            song, lyrics_id
        )
    );

    let (status, fetched) = server.get(&lyrics).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let other = server.song("Other").await;
    let (status, body) = server
        .get(&format!("/songs/{}/lyrics/{}", other, lyrics_id))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        message(&body),
        format!(
            "song with song_id={} not associated with song lyrics with song_lyrics_id={}",
            other, lyrics_id
        )
    );

    let one = format!("/songs/{}/lyrics/{}", song, lyrics_id);
    let (status, body) = server.delete(&one).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        message(&body),
        format!(
            "song lyrics with song_lyrics_id={} associated with song with song_id={} deleted",
            lyrics_id, song
        )
    );
    let (_, song_json) = server.get(&format!("/songs/{}", song)).await;
    assert!(song_json["song_lyrics_id"].is_null());

    let (status, body) = server.get(&one).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        message(&body),
        format!("no song lyrics with song_lyrics_id={}", lyrics_id)
    );
}
