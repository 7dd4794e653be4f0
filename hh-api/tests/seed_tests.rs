//! Seeding against an on-disk database

mod common;

use axum::http::StatusCode;
use common::*;
use hh_api::{build_router, seed, AppState};
use hh_common::db::init_database;
use tempfile::TempDir;

const HOBBIES: &str = r#"[
    {
        "_id": "6f1c2b7e-2a8d-4c53-9a51-3f0e8c0d2b11",
        "name": "Birdwatching",
        "description": "Spot and log local birds",
        "durationOptions": ["2 hours"],
        "locationOptions": ["Outdoor"],
        "tags": ["calm", "outdoors"],
        "difficultyLevels": [{ "level": "Beginner", "youtubeLinks": ["https://youtube.com/watch?v=1"] }],
        "locations": [{ "name": "Wetlands", "address": "Marsh Lane", "lat": 51.5, "lng": -0.1, "trialAvailable": true }],
        "equipment": ["Binoculars"],
        "costEstimate": "$",
        "safetyNotes": "Stay on paths",
        "wheelchairAccessible": false,
        "ecoFriendly": true
    }
]"#;

#[tokio::test]
async fn test_seeded_hobbies_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("hobby_helper.db");

    {
        let pool = init_database(&path).await.unwrap();
        let hobbies = seed::parse_hobbies(HOBBIES).unwrap();
        let report = seed::seed_hobbies(&pool, &hobbies).await.unwrap();
        assert_eq!(report.deleted, 0);
        assert_eq!(report.inserted, 1);

        // Reseeding replaces rather than duplicates
        let report = seed::seed_hobbies(&pool, &hobbies).await.unwrap();
        assert_eq!(report.deleted, 1);
        pool.close().await;
    }

    let pool = init_database(&path).await.unwrap();
    let app = build_router(AppState::new(pool, SECRET));

    let (status, body) = get(&app, "/api/hobbies/6f1c2b7e-2a8d-4c53-9a51-3f0e8c0d2b11", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Birdwatching");
    assert_eq!(body["moodEffects"], serde_json::json!(["relaxed"]));

    let (_, suggested) = get(&app, "/api/hobbies/suggestions?trialAvailable=true", None).await;
    assert_eq!(names(&suggested), vec!["Birdwatching"]);
}

#[tokio::test]
async fn test_backfill_fills_empty_moods() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("hobby_helper.db")).await.unwrap();

    store(&pool, &hobby("Knitting", &["craft"])).await;
    store(&pool, &hobby("Running", &["fitness"])).await;
    store(&pool, &hobby("Cooking", &["food"])).await;
    sqlx::query("UPDATE hobbies SET mood_effects = '[]'")
        .execute(&pool)
        .await
        .unwrap();

    let (total, preview) = seed::preview_backfill(&pool).await.unwrap();
    assert_eq!(total, 3);
    assert_eq!(preview.len(), 3);

    let report = seed::backfill_moods(&pool, 2).await.unwrap();
    assert_eq!(report.updated, 3);
    assert_eq!(report.remaining, 0);

    let app = build_router(AppState::new(pool, SECRET));
    let (_, body) = get(&app, "/api/hobbies", None).await;
    let moods: Vec<&serde_json::Value> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|h| &h["moodEffects"])
        .collect();
    assert_eq!(
        moods,
        vec![
            &serde_json::json!(["creative"]),
            &serde_json::json!(["energized"]),
            &serde_json::json!(["neutral"]),
        ]
    );
}
