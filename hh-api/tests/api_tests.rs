//! Integration tests for hh-api endpoints
//!
//! Drive the full router with `oneshot` against an in-memory database.

mod common;

use axum::http::StatusCode;
use common::*;
use hh_common::auth::issue_token;
use serde_json::json;
use uuid::Uuid;

// =============================================================================
// Health and routing
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let (app, _pool) = setup().await;

    let (status, body) = get(&app, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "hh-api");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_build_info() {
    let (app, _pool) = setup().await;

    let (status, body) = get(&app, "/build_info", None).await;
    assert_eq!(status, StatusCode::OK);
    for field in ["version", "git_hash", "build_timestamp", "build_profile"] {
        assert!(body[field].is_string(), "missing {}", field);
    }

    let (_, health) = get(&app, "/health", None).await;
    assert_eq!(body["version"], health["version"]);
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _pool) = setup().await;

    let (status, body) = get(&app, "/api/nothing-here", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Route not found");
}

#[tokio::test]
async fn test_malformed_json_body() {
    let (app, _pool) = setup().await;

    let req = axum::http::Request::builder()
        .method("POST")
        .uri("/api/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_bad_query_and_path_use_error_body() {
    let (app, _pool) = setup().await;

    let (status, body) = get(&app, "/api/hobbies/suggestions?duration=a&duration=b", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(body["error"]["message"].as_str().unwrap().contains("duration"));

    let (status, body) = get(&app, "/api/hobbies?name=a&name=b", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = get(&app, "/api/hobbies/%FF", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

// =============================================================================
// Registration and login
// =============================================================================

#[tokio::test]
async fn test_register_returns_token() {
    let (app, _pool) = setup().await;

    let (status, body) = post(
        &app,
        "/api/register",
        None,
        json!({ "name": "Ada", "email": "ada@example.com", "password": "pw123456" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().unwrap().split('.').count() == 3);
}

#[tokio::test]
async fn test_register_missing_fields() {
    let (app, _pool) = setup().await;

    for body in [
        json!({ "email": "a@example.com", "password": "pw" }),
        json!({ "name": "Ada", "password": "pw" }),
        json!({ "name": "Ada", "email": "a@example.com", "password": "" }),
    ] {
        let (status, resp) = post(&app, "/api/register", None, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"]["message"], "Name, email, and password are required.");
    }
}

#[tokio::test]
async fn test_register_duplicate_email_any_case() {
    let (app, _pool) = setup().await;
    register(&app, "ada@example.com", &[]).await;

    let (status, body) = post(
        &app,
        "/api/register",
        None,
        json!({ "name": "Ada 2", "email": "ADA@Example.com", "password": "pw" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "User already exists.");
}

#[tokio::test]
async fn test_login() {
    let (app, _pool) = setup().await;
    register(&app, "ada@example.com", &[]).await;

    let (status, body) = post(
        &app,
        "/api/login",
        None,
        json!({ "email": "Ada@example.com", "password": "secret123" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();

    let (status, _) = get(&app, "/api/users/current", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let (app, _pool) = setup().await;
    register(&app, "ada@example.com", &[]).await;

    for body in [
        json!({ "email": "ada@example.com", "password": "wrong" }),
        json!({ "email": "nobody@example.com", "password": "secret123" }),
        json!({}),
    ] {
        let (status, resp) = post(&app, "/api/login", None, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(resp["error"]["message"], "Invalid credentials");
    }
}

// =============================================================================
// Profile
// =============================================================================

#[tokio::test]
async fn test_profile_requires_valid_token() {
    let (app, _pool) = setup().await;

    let (status, _) = get(&app, "/api/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(&app, "/api/users", Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let foreign = issue_token(Uuid::new_v4(), "some-other-secret").unwrap();
    let (status, _) = get(&app, "/api/users/profile", Some(&foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_shape() {
    let (app, _pool) = setup().await;
    let (token, id) = register(&app, "ada@example.com", &["art"]).await;

    let (status, body) = get(&app, "/api/users/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_id"], id);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["favouriteTags"], json!(["art"]));
    assert_eq!(
        body["preferences"],
        json!({ "wheelchairAccessible": false, "ecoFriendly": false, "trialAvailable": false })
    );
    assert_eq!(body["hobbyHistory"], json!([]));
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_profile_history_newest_first_with_fallbacks() {
    let (app, pool) = setup().await;
    let (token, user_id) = register(&app, "ada@example.com", &[]).await;

    let pottery = hobby("Pottery", &["art"]);
    store(&pool, &pottery).await;

    let (status, _) = post(
        &app,
        "/api/user-hobbies",
        Some(&token),
        json!({ "user": user_id, "hobby": pottery.id, "performedAt": "2025-01-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = post(
        &app,
        "/api/users/history",
        Some(&token),
        json!({ "hobbyId": pottery.id, "performedAt": "2025-02-01T10:00:00Z", "rating": 4, "notes": "Fun" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Remove the hobby; history keeps the entries
    sqlx::query("DELETE FROM hobbies").execute(&pool).await.unwrap();

    let (_, body) = get(&app, "/api/users", Some(&token)).await;
    let history = body["hobbyHistory"].as_array().unwrap();
    assert_eq!(history.len(), 2);

    assert_eq!(history[0]["rating"], 4);
    assert_eq!(history[0]["notes"], "Fun");
    assert_eq!(history[0]["duration"], "N/A");
    assert_eq!(history[0]["hobbyId"], pottery.id.to_string());
    assert_eq!(history[0]["name"], "Unknown Hobby");

    assert_eq!(history[1]["rating"], 0);
    assert_eq!(history[1]["notes"], "");
}

#[tokio::test]
async fn test_update_profile() {
    let (app, _pool) = setup().await;
    let (token, _) = register(&app, "ada@example.com", &["art"]).await;

    let (status, body) = patch(
        &app,
        "/api/users",
        &token,
        json!({
            "name": "",
            "email": "",
            "favouriteTags": ["sport", "outdoors"],
            "preferences": { "ecoFriendly": true }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Test User");
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["favouriteTags"], json!(["sport", "outdoors"]));
    assert_eq!(
        body["preferences"],
        json!({ "wheelchairAccessible": false, "ecoFriendly": true, "trialAvailable": false })
    );

    // Preferences are replaced as a whole
    let (_, body) = patch(
        &app,
        "/api/users/profile",
        &token,
        json!({ "preferences": { "trialAvailable": true } }),
    )
    .await;
    assert_eq!(body["preferences"]["ecoFriendly"], false);
    assert_eq!(body["preferences"]["trialAvailable"], true);
}

#[tokio::test]
async fn test_update_password_and_email() {
    let (app, _pool) = setup().await;
    let (token, _) = register(&app, "ada@example.com", &[]).await;

    let (status, _) = patch(
        &app,
        "/api/users",
        &token,
        json!({ "email": "Ada.L@example.com", "password": "new-password" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post(
        &app,
        "/api/login",
        None,
        json!({ "email": "ada@example.com", "password": "secret123" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post(
        &app,
        "/api/login",
        None,
        json!({ "email": "ada.l@example.com", "password": "new-password" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_email_conflict() {
    let (app, _pool) = setup().await;
    register(&app, "taken@example.com", &[]).await;
    let (token, _) = register(&app, "ada@example.com", &[]).await;

    let (status, body) = patch(&app, "/api/users", &token, json!({ "email": "taken@example.com" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

// =============================================================================
// Hobbies
// =============================================================================

#[tokio::test]
async fn test_list_hobbies() {
    let (app, pool) = setup().await;
    store(&pool, &hobby("Pottery", &[])).await;
    store(&pool, &hobby("Rock Climbing", &[])).await;

    let (status, body) = get(&app, "/api/hobbies", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Pottery", "Rock Climbing"]);
    assert!(body[0]["_id"].is_string());
    assert!(body[0]["difficultyLevels"].is_array());
}

#[tokio::test]
async fn test_list_hobbies_by_name() {
    let (app, pool) = setup().await;
    store(&pool, &hobby("Rock Climbing", &[])).await;
    store(&pool, &hobby("Climbing", &[])).await;

    let (status, body) = get(&app, "/api/hobbies?name=rock%20climbing", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Rock Climbing"]);

    store(&pool, &hobby("Écriture", &[])).await;
    let (status, body) = get(&app, "/api/hobbies?name=%C3%A9criture", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Écriture"]);

    let (status, body) = get(&app, "/api/hobbies?name=Rock.*", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Hobby not found");
}

#[tokio::test]
async fn test_get_hobby_by_id() {
    let (app, pool) = setup().await;
    let pottery = hobby("Pottery", &["art"]);
    store(&pool, &pottery).await;

    let (status, body) = get(&app, &format!("/api/hobbies/{}", pottery.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Pottery");
    assert_eq!(body["moodEffects"], json!(["neutral"]));

    let (status, _) = get(&app, &format!("/api/hobbies/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app, "/api/hobbies/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_hobby() {
    let (app, _pool) = setup().await;
    let (token, _) = register(&app, "ada@example.com", &[]).await;

    let body = json!({
        "name": "Trail Running",
        "description": "Running on hills and forest trails",
        "tags": ["fitness", "adventure", "calm"],
        "locations": [{ "name": "Forest Park", "trialAvailable": true }]
    });

    let (status, _) = post(&app, "/api/hobbies", None, body.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, created) = post(&app, "/api/hobbies", Some(&token), body).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["moodEffects"], json!(["relaxed", "energized"]));
    assert_eq!(created["difficultyLevels"], json!([{ "level": "Beginner", "youtubeLinks": [] }]));
    assert_eq!(created["locations"][0]["address"], "");

    let (status, fetched) = get(&app, &format!("/api/hobbies/{}", created["_id"].as_str().unwrap()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Trail Running");
}

#[tokio::test]
async fn test_create_hobby_validation() {
    let (app, _pool) = setup().await;
    let (token, _) = register(&app, "ada@example.com", &[]).await;

    let (status, body) = post(
        &app,
        "/api/hobbies",
        Some(&token),
        json!({
            "name": "X",
            "description": "too short",
            "tags": [],
            "difficultyLevels": [{ "level": "Pro", "youtubeLinks": ["not-a-link"] }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields = &body["error"]["fields"];
    assert!(fields["name"].is_array());
    assert!(fields["description"].is_array());
    assert!(fields["tags"].is_array());
    assert!(fields["difficultyLevels[0].youtubeLinks[0]"].is_array());

    let (status, _) = post(
        &app,
        "/api/hobbies",
        Some(&token),
        json!({
            "name": "Juggling",
            "description": "Keeping things in the air",
            "tags": ["skill"],
            "moodEffects": ["ecstatic"]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Suggestions
// =============================================================================

#[tokio::test]
async fn test_suggestions_guest_capped_at_three() {
    let (app, pool) = setup().await;
    for i in 0..6 {
        store(&pool, &hobby(&format!("Hobby {}", i), &[])).await;
    }

    let (status, body) = get(&app, "/api/hobbies/suggestions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_suggestions_explicit_filters() {
    let (app, pool) = setup().await;
    let mut eco = hobby("Gardening", &[]);
    eco.eco_friendly = true;
    eco.duration_options = vec!["30 mins".to_string()];
    store(&pool, &eco).await;
    store(&pool, &hobby("Chess", &[])).await;

    let (_, body) = get(&app, "/api/hobbies/suggestions?ecoFriendly=true", None).await;
    assert_eq!(names(&body), vec!["Gardening"]);

    let (_, body) = get(&app, "/api/hobbies/suggestions?ecoFriendly=yes", None).await;
    assert_eq!(names(&body), vec!["Chess"]);

    let (_, body) = get(&app, "/api/hobbies/suggestions?duration=30%20mins", None).await;
    assert_eq!(names(&body), vec!["Gardening"]);

    let (_, body) = get(&app, "/api/hobbies/suggestions?location=Outdoor", None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_suggestions_trial_available_matches_any_location() {
    let (app, pool) = setup().await;
    let mut trial = hobby("Climbing", &[]);
    trial.locations[0].trial_available = true;
    store(&pool, &trial).await;
    store(&pool, &hobby("Chess", &[])).await;

    let (_, body) = get(&app, "/api/hobbies/suggestions?trialAvailable=true", None).await;
    assert_eq!(names(&body), vec!["Climbing"]);

    let (_, body) = get(&app, "/api/hobbies/suggestions?trialAvailable=false", None).await;
    assert_eq!(names(&body), vec!["Chess"]);
}

#[tokio::test]
async fn test_suggestions_preferences_and_override() {
    let (app, pool) = setup().await;
    let mut accessible = hobby("Painting", &[]);
    accessible.wheelchair_accessible = true;
    store(&pool, &accessible).await;
    store(&pool, &hobby("Hiking", &[])).await;

    let (token, _) = register(&app, "ada@example.com", &[]).await;
    patch(&app, "/api/users", &token, json!({ "preferences": { "wheelchairAccessible": true } })).await;

    let (_, body) = get(&app, "/api/hobbies/suggestions", Some(&token)).await;
    assert_eq!(names(&body), vec!["Painting"]);

    let (_, body) = get(&app, "/api/hobbies/suggestions?wheelchairAccessible=false", Some(&token)).await;
    assert_eq!(names(&body), vec!["Hiking"]);

    // Guests never get preference defaults
    let (_, body) = get(&app, "/api/hobbies/suggestions", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_suggestions_rank_by_favourite_tags() {
    let (app, pool) = setup().await;
    store(&pool, &hobby("Chess", &["strategy"])).await;
    store(&pool, &hobby("Sketching", &["art"])).await;
    store(&pool, &hobby("Mural Painting", &["art", "outdoors"])).await;

    let (token, _) = register(&app, "ada@example.com", &["art", "outdoors"]).await;

    for _ in 0..5 {
        let (_, body) = get(&app, "/api/hobbies/suggestions", Some(&token)).await;
        assert_eq!(names(&body), vec!["Mural Painting", "Sketching", "Chess"]);
    }
}

#[tokio::test]
async fn test_suggestions_try_new_excludes_performed() {
    let (app, pool) = setup().await;
    let done = hobby("Yoga", &[]);
    store(&pool, &done).await;
    store(&pool, &hobby("Fencing", &[])).await;

    let (token, user_id) = register(&app, "ada@example.com", &[]).await;
    post(
        &app,
        "/api/user-hobbies",
        Some(&token),
        json!({ "user": user_id, "hobby": done.id, "performedAt": "2025-05-05" }),
    )
    .await;

    let (_, body) = get(&app, "/api/hobbies/suggestions?tryNew=true", Some(&token)).await;
    assert_eq!(names(&body), vec!["Fencing"]);

    let (_, body) = get(&app, "/api/hobbies/suggestions?tryNew=false", Some(&token)).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Guests have nothing to exclude
    let (_, body) = get(&app, "/api/hobbies/suggestions?tryNew=true", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_suggestions_invalid_token_rejected() {
    let (app, _pool) = setup().await;

    let (status, _) = get(&app, "/api/hobbies/suggestions", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// User hobbies
// =============================================================================

#[tokio::test]
async fn test_user_hobby_create_and_list() {
    let (app, pool) = setup().await;
    let pottery = hobby("Pottery", &[]);
    store(&pool, &pottery).await;
    let (token, user_id) = register(&app, "ada@example.com", &[]).await;

    let (status, created) = post(
        &app,
        "/api/user-hobbies",
        Some(&token),
        json!({ "user": user_id, "hobby": pottery.id, "performedAt": "2025-04-01T09:30:00Z", "rating": 5, "notes": "Great" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["rating"], 5);
    assert_eq!(created["user"], user_id);

    let (status, list) = get(&app, &format!("/api/userHobbies/{}", user_id), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["hobby"]["name"], "Pottery");
    assert_eq!(list[0]["notes"], "Great");
}

#[tokio::test]
async fn test_user_hobby_rules() {
    let (app, pool) = setup().await;
    let pottery = hobby("Pottery", &[]);
    store(&pool, &pottery).await;
    let (token, user_id) = register(&app, "ada@example.com", &[]).await;
    let (_, other_id) = register(&app, "bob@example.com", &[]).await;

    let (status, _) = post(
        &app,
        "/api/user-hobbies",
        None,
        json!({ "user": user_id, "hobby": pottery.id, "performedAt": "2025-04-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = post(
        &app,
        "/api/user-hobbies",
        Some(&token),
        json!({ "user": other_id, "hobby": pottery.id, "performedAt": "2025-04-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = post(
        &app,
        "/api/user-hobbies",
        Some(&token),
        json!({ "user": user_id, "hobby": Uuid::new_v4(), "performedAt": "2025-04-01" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post(
        &app,
        "/api/user-hobbies",
        Some(&token),
        json!({ "user": user_id, "hobby": pottery.id, "performedAt": "someday", "rating": 6 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["fields"]["performedAt"].is_array());
    assert!(body["error"]["fields"]["rating"].is_array());

    let (status, _) = get(&app, &format!("/api/user-hobbies/{}", other_id), Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
