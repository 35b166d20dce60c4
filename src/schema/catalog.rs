//! The music catalog and marketplace entities.

use super::types::{Column, Entity, EntitySchema, ValueKind};

const GENDER: ValueKind = ValueKind::Enum(&["male", "female", "nonbinary"]);

pub const ALBUM: EntitySchema = EntitySchema {
    label: "album",
    table: "album",
    primary_key: "album_id",
    columns: &[
        Column::key("album_id"),
        Column::required("title", ValueKind::Text),
        Column::required("number_of_discs", ValueKind::Integer),
        Column::required("number_of_tracks", ValueKind::Integer),
        Column::optional("release_date", ValueKind::Date),
        Column::optional("album_cover_id", ValueKind::Integer),
    ],
    unique: &[],
};

pub const ARTIST: EntitySchema = EntitySchema {
    label: "artist",
    table: "artist",
    primary_key: "artist_id",
    columns: &[
        Column::key("artist_id"),
        Column::required("first_name", ValueKind::Text),
        Column::required("last_name", ValueKind::Text),
        Column::required("gender", GENDER),
        Column::required("birth_date", ValueKind::Date),
    ],
    unique: &[],
};

pub const GENRE: EntitySchema = EntitySchema {
    label: "genre",
    table: "genre",
    primary_key: "genre_id",
    columns: &[
        Column::key("genre_id"),
        Column::required("genre_name", ValueKind::Text),
    ],
    unique: &[],
};

pub const SONG: EntitySchema = EntitySchema {
    label: "song",
    table: "song",
    primary_key: "song_id",
    columns: &[
        Column::key("song_id"),
        Column::required("title", ValueKind::Text),
        Column::required("length_minutes", ValueKind::Integer),
        Column::required("length_seconds", ValueKind::Integer),
        Column::optional("song_lyrics_id", ValueKind::Integer),
    ],
    unique: &[],
};

pub const SONG_LYRICS: EntitySchema = EntitySchema {
    label: "song lyrics",
    table: "song_lyrics",
    primary_key: "song_lyrics_id",
    columns: &[
        Column::key("song_lyrics_id"),
        Column::required("lyrics", ValueKind::Text),
        Column::optional("song_id", ValueKind::Integer),
    ],
    unique: &[],
};

pub const USER: EntitySchema = EntitySchema {
    label: "user",
    table: "user_",
    primary_key: "user_id",
    columns: &[
        Column::key("user_id"),
        Column::required("user_name", ValueKind::Text),
        Column::required("first_name", ValueKind::Text),
        Column::required("last_name", ValueKind::Text),
        Column::required("gender", GENDER),
        Column::required("date_joined", ValueKind::Date),
        Column::optional("buyer_id", ValueKind::Integer),
        Column::optional("seller_id", ValueKind::Integer),
    ],
    unique: &[],
};

pub const USER_PASSWORD: EntitySchema = EntitySchema {
    label: "user password",
    table: "user_password",
    primary_key: "password_id",
    columns: &[
        Column::key("password_id"),
        Column::required("encrypted_password", ValueKind::Bytes),
        Column::optional("user_id", ValueKind::Integer),
    ],
    unique: &[&["user_id"]],
};

pub const BUYER_ACCOUNT: EntitySchema = EntitySchema {
    label: "buyer account",
    table: "buyer_account",
    primary_key: "buyer_id",
    columns: &[
        Column::key("buyer_id"),
        Column::optional("postboard_name", ValueKind::Text),
        Column::required("date_created", ValueKind::Date),
        Column::optional("user_id", ValueKind::Integer),
    ],
    unique: &[],
};

pub const SELLER_ACCOUNT: EntitySchema = EntitySchema {
    label: "seller account",
    table: "seller_account",
    primary_key: "seller_id",
    columns: &[
        Column::key("seller_id"),
        Column::optional("storefront_name", ValueKind::Text),
        Column::required("date_created", ValueKind::Date),
        Column::optional("user_id", ValueKind::Integer),
    ],
    unique: &[],
};

pub const TO_BUY_LISTING: EntitySchema = EntitySchema {
    label: "to-buy listing",
    table: "to_buy_listing",
    primary_key: "to_buy_listing_id",
    columns: &[
        Column::key("to_buy_listing_id"),
        Column::required("max_accepting_price", ValueKind::Decimal),
        Column::optional("date_posted", ValueKind::Date),
        Column::optional("album_id", ValueKind::Integer),
        Column::optional("buyer_id", ValueKind::Integer),
    ],
    unique: &[],
};

pub const TO_SELL_LISTING: EntitySchema = EntitySchema {
    label: "to-sell listing",
    table: "to_sell_listing",
    primary_key: "to_sell_listing_id",
    columns: &[
        Column::key("to_sell_listing_id"),
        Column::required("asking_price", ValueKind::Decimal),
        Column::optional("date_posted", ValueKind::Date),
        Column::optional("album_id", ValueKind::Integer),
        Column::optional("seller_id", ValueKind::Integer),
    ],
    unique: &[],
};

pub const ALBUM_GENRE_BRIDGE: EntitySchema = EntitySchema {
    label: "album genre link",
    table: "album_genre_bridge",
    primary_key: "album_genre_bridge_id",
    columns: &[
        Column::key("album_genre_bridge_id"),
        Column::required("album_id", ValueKind::Integer),
        Column::required("genre_id", ValueKind::Integer),
    ],
    unique: &[&["album_id", "genre_id"]],
};

pub const ALBUM_SONG_BRIDGE: EntitySchema = EntitySchema {
    label: "album track",
    table: "album_song_bridge",
    primary_key: "album_song_bridge_id",
    columns: &[
        Column::key("album_song_bridge_id"),
        Column::required("album_id", ValueKind::Integer),
        Column::required("song_id", ValueKind::Integer),
        Column::required("disc_number", ValueKind::Integer),
        Column::required("track_number", ValueKind::Integer),
    ],
    unique: &[
        &["album_id", "song_id"],
        &["album_id", "disc_number", "track_number"],
    ],
};

pub const ARTIST_ALBUM_BRIDGE: EntitySchema = EntitySchema {
    label: "artist album link",
    table: "artist_album_bridge",
    primary_key: "artist_album_bridge_id",
    columns: &[
        Column::key("artist_album_bridge_id"),
        Column::required("artist_id", ValueKind::Integer),
        Column::required("album_id", ValueKind::Integer),
    ],
    unique: &[&["artist_id", "album_id"]],
};

pub const ARTIST_GENRE_BRIDGE: EntitySchema = EntitySchema {
    label: "artist genre link",
    table: "artist_genre_bridge",
    primary_key: "artist_genre_bridge_id",
    columns: &[
        Column::key("artist_genre_bridge_id"),
        Column::required("artist_id", ValueKind::Integer),
        Column::required("genre_id", ValueKind::Integer),
    ],
    unique: &[&["artist_id", "genre_id"]],
};

pub const ARTIST_SONG_BRIDGE: EntitySchema = EntitySchema {
    label: "artist song link",
    table: "artist_song_bridge",
    primary_key: "artist_song_bridge_id",
    columns: &[
        Column::key("artist_song_bridge_id"),
        Column::required("artist_id", ValueKind::Integer),
        Column::required("song_id", ValueKind::Integer),
    ],
    unique: &[&["artist_id", "song_id"]],
};

pub const SONG_GENRE_BRIDGE: EntitySchema = EntitySchema {
    label: "song genre link",
    table: "song_genre_bridge",
    primary_key: "song_genre_bridge_id",
    columns: &[
        Column::key("song_genre_bridge_id"),
        Column::required("song_id", ValueKind::Integer),
        Column::required("genre_id", ValueKind::Integer),
    ],
    unique: &[&["song_id", "genre_id"]],
};

/// Every table, in creation order.
pub const ALL: &[&EntitySchema] = &[
    &ALBUM,
    &ARTIST,
    &GENRE,
    &SONG,
    &SONG_LYRICS,
    &USER,
    &USER_PASSWORD,
    &BUYER_ACCOUNT,
    &SELLER_ACCOUNT,
    &TO_BUY_LISTING,
    &TO_SELL_LISTING,
    &ALBUM_GENRE_BRIDGE,
    &ALBUM_SONG_BRIDGE,
    &ARTIST_ALBUM_BRIDGE,
    &ARTIST_GENRE_BRIDGE,
    &ARTIST_SONG_BRIDGE,
    &SONG_GENRE_BRIDGE,
];

macro_rules! entity {
    ($name:ident => $schema:ident) => {
        pub struct $name;

        impl Entity for $name {
            const SCHEMA: &'static EntitySchema = &$schema;
        }
    };
}

entity!(Album => ALBUM);
entity!(Artist => ARTIST);
entity!(Genre => GENRE);
entity!(Song => SONG);
entity!(SongLyrics => SONG_LYRICS);
entity!(User => USER);
entity!(UserPassword => USER_PASSWORD);
entity!(BuyerAccount => BUYER_ACCOUNT);
entity!(SellerAccount => SELLER_ACCOUNT);
entity!(ToBuyListing => TO_BUY_LISTING);
entity!(ToSellListing => TO_SELL_LISTING);
entity!(AlbumGenreBridge => ALBUM_GENRE_BRIDGE);
entity!(AlbumSongBridge => ALBUM_SONG_BRIDGE);
entity!(ArtistAlbumBridge => ARTIST_ALBUM_BRIDGE);
entity!(ArtistGenreBridge => ARTIST_GENRE_BRIDGE);
entity!(ArtistSongBridge => ARTIST_SONG_BRIDGE);
entity!(SongGenreBridge => SONG_GENRE_BRIDGE);
