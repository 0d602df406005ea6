use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use lmn::config::Config;
use lmn::db::{NewVenue, Store};
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Store,
    show_id: i32,
    alice_key: String,
    bob_key: String,
}

async fn spawn_app() -> TestApp {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.observability.metrics_enabled = false;

    let state = lmn::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let store = state.store.clone();

    let rem = store.create_artist("REM").await.unwrap();
    store.create_artist("atmosphere").await.unwrap();
    store.create_artist("Brother Ali").await.unwrap();
    let venue = store
        .create_venue(&NewVenue {
            name: "First Avenue".to_string(),
            city: "Minneapolis".to_string(),
            state: "MN".to_string(),
            address: Some("701 N 1st Ave".to_string()),
            thumbnail: None,
        })
        .await
        .unwrap();
    let show_id = store
        .create_show(
            rem,
            venue,
            Utc.with_ymd_and_hms(2017, 2, 2, 2, 0, 0).unwrap(),
        )
        .await
        .unwrap();

    let alice = store.create_user("alice", false).await.unwrap();
    let bob = store.create_user("bob", false).await.unwrap();

    TestApp {
        router: lmn::api::router(state),
        store,
        show_id,
        alice_key: alice.api_key,
        bob_key: bob.api_key,
    }
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    key: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("X-Api-Key", key);
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn note_body(title: &str) -> Value {
    json!({"title": title, "text": "They played everything", "rating": 5})
}

#[tokio::test]
async fn test_catalog_browsing() {
    let app = spawn_app().await;

    let (status, json) = send(&app, "GET", "/api/artists", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["atmosphere", "Brother Ali", "REM"]);

    let (status, json) = send(&app, "GET", "/api/artists/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);

    let (status, _) = send(&app, "GET", "/api/artists/0", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/shows/{}", app.show_id);
    let (status, json) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["artist"]["name"], "REM");
    assert_eq!(json["data"]["venue"]["name"], "First Avenue");
    assert!(
        json["data"]["show_date"]
            .as_str()
            .unwrap()
            .starts_with("2017-02-02")
    );

    let (_, json) = send(&app, "GET", "/api/venues", None, None).await;
    let venue_id = json["data"][0]["id"].as_i64().unwrap();
    let (status, json) = send(
        &app,
        "GET",
        &format!("/api/venues/{venue_id}/shows"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["artist"]["name"], "REM");
}

#[tokio::test]
async fn test_posting_notes_requires_identity() {
    let app = spawn_app().await;
    let uri = format!("/api/shows/{}/notes", app.show_id);

    let (status, _) = send(&app, "POST", &uri, None, Some(note_body("Great"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "POST", &uri, Some("wrong"), Some(note_body("Great"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) = send(
        &app,
        "POST",
        &uri,
        Some(&app.alice_key),
        Some(note_body("Great")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["title"], "Great");
    assert_eq!(json["data"]["stars"], "★★★★★");

    let (status, json) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let (status, json) = send(&app, "GET", "/api/notes/latest", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["title"], "Great");
}

#[tokio::test]
async fn test_note_validation() {
    let app = spawn_app().await;
    let uri = format!("/api/shows/{}/notes", app.show_id);
    let key = Some(app.alice_key.as_str());

    let bad_rating = json!({"title": "Hmm", "text": "ok", "rating": 9});
    let (status, _) = send(&app, "POST", &uri, key, Some(bad_rating)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long_title = json!({"title": "t".repeat(201), "text": "ok"});
    let (status, _) = send(&app, "POST", &uri, key, Some(long_title)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/api/shows/999/notes", key, Some(note_body("x"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/api/shows/999/notes", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_note_ownership() {
    let app = spawn_app().await;
    let uri = format!("/api/shows/{}/notes", app.show_id);
    let alice = Some(app.alice_key.as_str());
    let bob = Some(app.bob_key.as_str());

    let (_, json) = send(&app, "POST", &uri, alice, Some(note_body("Mine"))).await;
    let note_id = json["data"]["id"].as_i64().unwrap();
    let note_uri = format!("/api/notes/{note_id}");

    let (status, _) = send(&app, "GET", &note_uri, alice, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &note_uri, bob, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "PUT", &note_uri, bob, Some(note_body("Stolen"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &note_uri, bob, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", "/api/notes/1000000", alice, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&app, "PUT", &note_uri, alice, Some(note_body("Edited"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "Edited");

    let (_, json) = send(&app, "GET", "/api/notes/mine", bob, None).await;
    assert!(json["data"].as_array().unwrap().is_empty());

    let (status, _) = send(&app, "DELETE", &note_uri, alice, None).await;
    assert_eq!(status, StatusCode::OK);
    let gone = app.store.get_note(i32::try_from(note_id).unwrap()).await;
    assert!(gone.unwrap().is_none());
}

#[tokio::test]
async fn test_profiles() {
    let app = spawn_app().await;
    let alice = Some(app.alice_key.as_str());

    let (status, json) = send(&app, "GET", "/api/users/me", alice, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["username"], "alice");
    assert!(json["data"]["bio"].is_null());
    let alice_id = json["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        "/api/users/me/profile",
        alice,
        Some(json!({"bio": "b".repeat(501)})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/users/me/profile",
        alice,
        Some(json!({"bio": "Front row regular"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/shows/{}/notes", app.show_id);
    send(&app, "POST", &uri, alice, Some(note_body("Again"))).await;

    let (status, json) = send(&app, "GET", &format!("/api/users/{alice_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["bio"], "Front row regular");
    assert_eq!(json["data"]["notes"][0]["title"], "Again");
    assert!(json["data"].get("api_key").is_none());

    let (status, _) = send(&app, "GET", "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_system_status() {
    let app = spawn_app().await;

    let (status, json) = send(&app, "GET", "/api/system/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["database_ok"], true);
    assert_eq!(json["data"]["artists"], 3);
    assert_eq!(json["data"]["shows"], 1);
}
