//! Catalogue seeding and mood backfill
//!
//! Backing logic of the `hh-seed` tool. Seed files are JSON arrays in the
//! client's camelCase shape. Hobby files are held to a strict schema: every
//! field is required except `moodEffects` (inferred from tags when missing),
//! `createdAt` and `_id`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use hh_common::db::{DifficultyLevel, Hobby, HobbyLocation, UserHobby};
use hh_common::mood::infer_mood_effects;
use hh_common::time::parse_timestamp;
use hh_common::Mood;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db;

/// Default number of hobbies updated per backfill transaction
pub const DEFAULT_BATCH_SIZE: i64 = 500;

/// Examples shown by a backfill dry run
pub const PREVIEW_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedDifficultyLevel {
    level: String,
    youtube_links: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedLocation {
    name: String,
    address: String,
    lat: f64,
    lng: f64,
    trial_available: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedHobby {
    #[serde(default, rename = "_id")]
    id: Option<Uuid>,
    name: String,
    description: String,
    duration_options: Vec<String>,
    location_options: Vec<String>,
    tags: Vec<String>,
    difficulty_levels: Vec<SeedDifficultyLevel>,
    locations: Vec<SeedLocation>,
    equipment: Vec<String>,
    cost_estimate: String,
    safety_notes: String,
    wheelchair_accessible: bool,
    eco_friendly: bool,
    #[serde(default)]
    mood_effects: Option<Vec<Mood>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<SeedHobby> for Hobby {
    fn from(seed: SeedHobby) -> Self {
        let mood_effects = match seed.mood_effects {
            Some(moods) if !moods.is_empty() => moods,
            _ => infer_mood_effects(&seed.tags),
        };

        Hobby {
            id: seed.id.unwrap_or_else(Uuid::new_v4),
            name: seed.name,
            description: seed.description,
            duration_options: seed.duration_options,
            location_options: seed.location_options,
            tags: seed.tags,
            difficulty_levels: seed
                .difficulty_levels
                .into_iter()
                .map(|d| DifficultyLevel {
                    level: d.level,
                    youtube_links: d.youtube_links,
                })
                .collect(),
            locations: seed
                .locations
                .into_iter()
                .map(|l| HobbyLocation {
                    name: l.name,
                    address: l.address,
                    lat: Some(l.lat),
                    lng: Some(l.lng),
                    trial_available: l.trial_available,
                })
                .collect(),
            equipment: seed.equipment,
            cost_estimate: seed.cost_estimate,
            safety_notes: seed.safety_notes,
            wheelchair_accessible: seed.wheelchair_accessible,
            eco_friendly: seed.eco_friendly,
            mood_effects,
            created_at: seed.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedUserHobby {
    #[serde(default, rename = "_id")]
    id: Option<Uuid>,
    user: Uuid,
    hobby: Uuid,
    performed_at: String,
    #[serde(default)]
    rating: Option<u8>,
    #[serde(default)]
    notes: Option<String>,
}

/// Parse a JSON array, reporting the index of the first bad element
fn parse_array<T: for<'de> Deserialize<'de>>(json: &str) -> Result<Vec<T>> {
    let items: Vec<serde_json::Value> =
        serde_json::from_str(json).context("Seed file must be a JSON array")?;

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).with_context(|| format!("Invalid entry at index {}", i))
        })
        .collect()
}

/// Parse and validate a hobby seed file
pub fn parse_hobbies(json: &str) -> Result<Vec<Hobby>> {
    let seeds: Vec<SeedHobby> = parse_array(json)?;
    Ok(seeds.into_iter().map(Hobby::from).collect())
}

/// Parse and validate a user hobby seed file
pub fn parse_user_hobbies(json: &str) -> Result<Vec<UserHobby>> {
    let seeds: Vec<SeedUserHobby> = parse_array(json)?;
    let now = Utc::now();

    seeds
        .into_iter()
        .enumerate()
        .map(|(i, seed)| {
            let performed_at = parse_timestamp(&seed.performed_at).with_context(|| {
                format!("Invalid performedAt at index {}: {:?}", i, seed.performed_at)
            })?;
            if let Some(rating) = seed.rating {
                anyhow::ensure!(
                    (1..=5).contains(&rating),
                    "Rating at index {} must be between 1 and 5, got {}",
                    i,
                    rating
                );
            }
            Ok(UserHobby {
                id: seed.id.unwrap_or_else(Uuid::new_v4),
                user: seed.user,
                hobby: seed.hobby,
                performed_at,
                rating: seed.rating,
                notes: seed.notes,
                created_at: now,
                updated_at: now,
            })
        })
        .collect()
}

/// Outcome of replacing a table's contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub deleted: u64,
    pub inserted: usize,
}

/// Replace the whole hobby catalogue in one transaction
pub async fn seed_hobbies(pool: &SqlitePool, hobbies: &[Hobby]) -> Result<SeedReport> {
    let mut tx = pool.begin().await?;

    let deleted = db::hobbies::delete_all_hobbies(&mut *tx).await?;
    for hobby in hobbies {
        db::hobbies::insert_hobby(&mut *tx, hobby)
            .await
            .with_context(|| format!("Failed to insert hobby {:?}", hobby.name))?;
    }

    tx.commit().await?;
    info!("Replaced {} hobbies with {}", deleted, hobbies.len());

    Ok(SeedReport {
        deleted,
        inserted: hobbies.len(),
    })
}

/// Replace all hobby history in one transaction
pub async fn seed_user_hobbies(pool: &SqlitePool, entries: &[UserHobby]) -> Result<SeedReport> {
    let mut tx = pool.begin().await?;

    let deleted = db::user_hobbies::delete_all_user_hobbies(&mut *tx).await?;
    for entry in entries {
        db::user_hobbies::insert_user_hobby(&mut *tx, entry)
            .await
            .with_context(|| format!("Failed to insert user hobby {} (unknown user?)", entry.id))?;
    }

    tx.commit().await?;
    info!("Replaced {} user hobbies with {}", deleted, entries.len());

    Ok(SeedReport {
        deleted,
        inserted: entries.len(),
    })
}

/// A hobby the backfill would update, with the moods it would get
#[derive(Debug, Clone)]
pub struct BackfillPreview {
    pub name: String,
    pub tags: Vec<String>,
    pub moods: Vec<Mood>,
}

/// Count hobbies lacking moods and show what the first few would receive
pub async fn preview_backfill(pool: &SqlitePool) -> Result<(i64, Vec<BackfillPreview>)> {
    let total = db::hobbies::count_missing_moods(pool).await?;
    let sample = db::hobbies::hobbies_missing_moods(pool, PREVIEW_LIMIT).await?;

    let previews = sample
        .into_iter()
        .map(|hobby| BackfillPreview {
            moods: infer_mood_effects(&hobby.tags),
            name: hobby.name,
            tags: hobby.tags,
        })
        .collect();

    Ok((total, previews))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillReport {
    pub updated: u64,
    pub remaining: i64,
}

/// Infer and store moods for every hobby lacking them, one transaction per batch
pub async fn backfill_moods(pool: &SqlitePool, batch_size: i64) -> Result<BackfillReport> {
    anyhow::ensure!(batch_size > 0, "Batch size must be positive");

    let mut updated = 0u64;
    loop {
        let batch = db::hobbies::hobbies_missing_moods(pool, batch_size).await?;
        if batch.is_empty() {
            break;
        }

        let mut tx = pool.begin().await?;
        for hobby in &batch {
            let moods = infer_mood_effects(&hobby.tags);
            db::hobbies::set_mood_effects(&mut *tx, hobby.id, &moods).await?;
        }
        tx.commit().await?;

        updated += batch.len() as u64;
        info!("…updated so far: {}", updated);
    }

    let remaining = db::hobbies::count_missing_moods(pool).await?;
    Ok(BackfillReport { updated, remaining })
}
