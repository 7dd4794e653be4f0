//! Shared helpers for hh-api integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use hh_api::{build_router, AppState};
use hh_common::db::{init_memory_database, DifficultyLevel, Hobby, HobbyLocation};
use hh_common::Mood;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";

/// App over a fresh in-memory database
pub async fn setup() -> (Router, SqlitePool) {
    let pool = init_memory_database()
        .await
        .expect("Should create in-memory database");
    let app = build_router(AppState::new(pool.clone(), SECRET));
    (app, pool)
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the JSON body (`Null` when empty)
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, body)
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, request("GET", uri, token, None)).await
}

pub async fn post(app: &Router, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
    send(app, request("POST", uri, token, Some(body))).await
}

pub async fn patch(app: &Router, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
    send(app, request("PATCH", uri, Some(token), Some(body))).await
}

/// Register a user and return (token, user id)
pub async fn register(app: &Router, email: &str, tags: &[&str]) -> (String, String) {
    let (status, body) = post(
        app,
        "/api/register",
        None,
        json!({ "name": "Test User", "email": email, "password": "secret123", "favouriteTags": tags }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    let token = body["token"].as_str().unwrap().to_string();

    let (_, profile) = get(app, "/api/users", Some(&token)).await;
    let id = profile["_id"].as_str().unwrap().to_string();
    (token, id)
}

pub fn hobby(name: &str, tags: &[&str]) -> Hobby {
    Hobby {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: format!("{} is a fine way to spend time", name),
        duration_options: vec!["1 hour".to_string()],
        location_options: vec!["Indoor".to_string()],
        tags: tags.iter().map(|t| t.to_string()).collect(),
        difficulty_levels: vec![DifficultyLevel {
            level: "Beginner".to_string(),
            youtube_links: vec![],
        }],
        locations: vec![HobbyLocation {
            name: "Community Centre".to_string(),
            address: "2 High St".to_string(),
            lat: Some(53.3),
            lng: Some(-6.2),
            trial_available: false,
        }],
        equipment: vec![],
        cost_estimate: "Free".to_string(),
        safety_notes: String::new(),
        wheelchair_accessible: false,
        eco_friendly: false,
        mood_effects: vec![Mood::Neutral],
        created_at: Utc::now(),
    }
}

pub async fn store(pool: &SqlitePool, hobby: &Hobby) {
    hh_api::db::hobbies::insert_hobby(pool, hobby)
        .await
        .expect("Should insert hobby");
}

pub fn names(body: &Value) -> Vec<String> {
    body.as_array()
        .expect("Should be an array")
        .iter()
        .map(|h| h["name"].as_str().unwrap().to_string())
        .collect()
}
