//! In-process server over the in-memory store, driven over HTTP.

#![allow(dead_code)]

use moundmusic::{app, AppState};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub struct TestServer {
    base_url: String,
    client: reqwest::Client,
}

pub const BODY_LIMIT: usize = 64 * 1024;

pub async fn spawn() -> TestServer {
    let router = app(AppState::in_memory(), BODY_LIMIT);
    // Ephemeral port so suites can run in parallel.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

impl TestServer {
    pub async fn send(&self, method: Method, path: &str, body: Option<String>) -> (StatusCode, Value) {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(body) = body {
            req = req.header("content-type", "application/json").body(body);
        }
        let resp = req.send().await.unwrap();
        let status = resp.status();
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, path, Some(body.to_string())).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, path, Some(body.to_string())).await
    }

    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, path, None).await
    }

    /// POST that must succeed with 201; returns the created record's id under `key`.
    pub async fn create(&self, path: &str, body: Value, key: &str) -> i64 {
        let (status, created) = self.post(path, body).await;
        assert_eq!(status, StatusCode::CREATED, "POST {} -> {}", path, created);
        created[key].as_i64().unwrap()
    }

    pub async fn album(&self, title: &str) -> i64 {
        self.create(
            "/albums",
            json!({"title": title, "number_of_discs": 1, "number_of_tracks": 10, "release_date": "1998-01-01"}),
            "album_id",
        )
        .await
    }

    pub async fn song(&self, title: &str) -> i64 {
        self.create(
            "/songs",
            json!({"title": title, "length_minutes": 3, "length_seconds": 30}),
            "song_id",
        )
        .await
    }

    pub async fn genre(&self, name: &str) -> i64 {
        self.create("/genres", json!({ "genre_name": name }), "genre_id").await
    }

    pub async fn artist(&self, first: &str, last: &str) -> i64 {
        self.create(
            "/artists",
            json!({"first_name": first, "last_name": last, "gender": "female", "birth_date": "1933-02-21"}),
            "artist_id",
        )
        .await
    }

    pub async fn user(&self, user_name: &str) -> i64 {
        self.create(
            "/users",
            json!({
                "user_name": user_name,
                "first_name": "Jane",
                "last_name": "Doe",
                "gender": "nonbinary",
                "date_joined": "2020-05-01"
            }),
            "user_id",
        )
        .await
    }
}

pub fn message(body: &Value) -> &str {
    body["message"].as_str().unwrap_or("")
}
