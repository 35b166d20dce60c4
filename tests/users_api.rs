//! Users: passwords, buyer and seller accounts, and account listings.

mod common;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::{message, spawn};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn password_set_and_authenticate() {
    let server = spawn().await;
    let user = server.user("jdoe").await;
    let password = format!("/users/{}/password", user);
    let authenticate = format!("/users/{}/password/authenticate", user);

    let (status, body) = server.post(&authenticate, json!({"password": "secret"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        message(&body),
        format!("user with user_id={} has no password set", user)
    );

    let (status, stored) = server.post(&password, json!({"password": "secret"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["user_id"], user);
    let digest = BASE64
        .decode(stored["encrypted_password"].as_str().unwrap())
        .unwrap();
    let digest = String::from_utf8(digest).unwrap();
    assert!(digest.starts_with("$2"), "not a bcrypt digest: {}", digest);
    assert!(!digest.contains("secret"));

    let (status, body) = server.post(&authenticate, json!({"password": "secret"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"authenticates": true}));

    let (_, body) = server.post(&authenticate, json!({"password": "guess"})).await;
    assert_eq!(body, json!({"authenticates": false}));

    // Setting again replaces the stored digest.
    let (status, replaced) = server.post(&password, json!({"password": "newer"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["password_id"], stored["password_id"]);
    let (_, body) = server.post(&authenticate, json!({"password": "secret"})).await;
    assert_eq!(body, json!({"authenticates": false}));
    let (_, body) = server.post(&authenticate, json!({"password": "newer"})).await;
    assert_eq!(body, json!({"authenticates": true}));
}

#[tokio::test]
async fn password_input_is_checked() {
    let server = spawn().await;
    let user = server.user("jdoe").await;
    let password = format!("/users/{}/password", user);

    let (status, body) = server
        .post(&password, json!({"password": "x", "hint": "y"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "unexpected property in input: 'hint'");

    let (status, body) = server
        .post(&password, json!({"password": "x", "password_input_id": 1}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "unexpected property in input: 'password_input_id'");

    let (status, body) = server.post(&password, json!({"password": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "value for 'password' is a string of zero length");

    let (status, body) = server.post(&password, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "json object missing required property: 'password'");

    let (status, body) = server.post("/users/99/password", json!({"password": "x"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "no user with user_id=99");

    let (status, _) = server.get(&password).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn buyer_account_and_listings() {
    let server = spawn().await;
    let user = server.user("buyer").await;
    let album = server.album("Wanted").await;
    let account = format!("/users/{}/buyer_account", user);

    let (status, body) = server.get(&account).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        message(&body),
        format!("user with user_id={} has no associated buyer account", user)
    );

    let (status, body) = server.post(&account, json!({"date_created": "2020-01-01"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "unexpected property in input: 'date_created'");

    let (status, opened) = server.post(&account, json!({"postboard_name": "crate digger"})).await;
    assert_eq!(status, StatusCode::CREATED);
    let buyer_id = opened["buyer_id"].as_i64().unwrap();
    assert_eq!(opened["user_id"], user);
    assert_eq!(opened["date_created"].as_str().unwrap().len(), 10);

    let (_, user_json) = server.get(&format!("/users/{}", user)).await;
    assert_eq!(user_json["buyer_id"], buyer_id);

    let (status, body) = server.post(&account, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        message(&body),
        format!(
            "user with user_id={} already has a buyer account with buyer_id={} associated",
            user, buyer_id
        )
    );

    let (status, fetched) = server.get(&account).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, opened);

    let listings = format!("{}/{}/listings", account, buyer_id);
    let (status, list) = server.get(&listings).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));

    let (status, body) = server.post(&listings, json!({ "album_id": album })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        message(&body),
        "json object missing required property: 'max_accepting_price'"
    );

    let (status, body) = server
        .post(&listings, json!({"max_accepting_price": 10, "buyer_id": 5}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "unexpected property in input: 'buyer_id'");

    let (status, listing) = server
        .post(&listings, json!({"max_accepting_price": 12.5, "album_id": album}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let listing_id = listing["to_buy_listing_id"].as_i64().unwrap();
    assert_eq!(listing["buyer_id"], buyer_id);
    assert_eq!(listing["max_accepting_price"], 12.5);
    assert!(listing["date_posted"].is_string());

    let one = format!("{}/{}", listings, listing_id);
    let (status, patched) = server.patch(&one, json!({"max_accepting_price": "15"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["max_accepting_price"], 15.0);

    let (status, body) = server.patch(&one, json!({"buyer_id": 9})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(message(&body), "unexpected property in input: 'buyer_id'");

    let (_, list) = server.get(&listings).await;
    assert_eq!(list, json!([patched]));

    let (status, body) = server.delete(&one).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        message(&body),
        format!("to-buy listing with to_buy_listing_id={} deleted", listing_id)
    );
    let (status, body) = server.get(&one).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        message(&body),
        format!("no to-buy listing with to_buy_listing_id={}", listing_id)
    );

    let (status, body) = server.delete(&format!("{}/{}", account, buyer_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        message(&body),
        format!(
            "buyer account with buyer_id={} associated with user with user_id={} disassociated and deleted",
            buyer_id, user
        )
    );
    let (_, user_json) = server.get(&format!("/users/{}", user)).await;
    assert!(user_json["buyer_id"].is_null());
}

#[tokio::test]
async fn accounts_belong_to_their_user() {
    let server = spawn().await;
    let owner = server.user("owner").await;
    let other = server.user("other").await;
    let (_, opened) = server
        .post(&format!("/users/{}/seller_account", owner), json!({"storefront_name": "Vinyl Hut"}))
        .await;
    let seller_id = opened["seller_id"].as_i64().unwrap();

    let (status, body) = server
        .get(&format!("/users/{}/seller_account/{}", other, seller_id))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        message(&body),
        format!(
            "user with user_id={} not associated with seller account with seller_id={}",
            other, seller_id
        )
    );

    let (status, body) = server
        .get(&format!("/users/{}/seller_account/{}/listings", other, seller_id))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(message(&body).contains("not associated with seller account"));

    let listings = format!("/users/{}/seller_account/{}/listings", owner, seller_id);
    let (status, listing) = server
        .post(&listings, json!({"asking_price": 20, "date_posted": "2021-03-04"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(listing["date_posted"], "2021-03-04");
    assert_eq!(listing["seller_id"], seller_id);

    let (status, body) = server
        .get(&format!("/users/{}/seller_account/{}/listings/99", owner, seller_id))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message(&body), "no to-sell listing with to_sell_listing_id=99");
}
