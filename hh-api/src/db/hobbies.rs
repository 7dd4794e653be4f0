//! Hobby catalogue queries

use std::collections::HashMap;

use hh_common::db::{Hobby, HobbyRow};
use hh_common::{Mood, Result};
use sqlx::{types::Json, Executor, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::recommend::HobbyCriteria;

const HOBBY_COLUMNS: &str = "guid, name, description, duration_options, location_options, tags, \
     difficulty_levels, locations, equipment, cost_estimate, safety_notes, \
     wheelchair_accessible, eco_friendly, mood_effects, created_at";

fn into_hobbies(rows: Vec<HobbyRow>) -> Result<Vec<Hobby>> {
    rows.into_iter().map(Hobby::try_from).collect()
}

/// All hobbies, oldest first
pub async fn list_hobbies(pool: &SqlitePool) -> Result<Vec<Hobby>> {
    let rows: Vec<HobbyRow> = sqlx::query_as(&format!(
        "SELECT {} FROM hobbies ORDER BY created_at ASC, rowid ASC",
        HOBBY_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    into_hobbies(rows)
}

/// Hobbies whose name equals `name`, ignoring case
///
/// SQLite's `NOCASE` only folds ASCII, so names are compared after Unicode
/// lowercasing here and the matching rows fetched by id.
pub async fn find_hobbies_by_name(pool: &SqlitePool, name: &str) -> Result<Vec<Hobby>> {
    let wanted = name.to_lowercase();
    let names: Vec<(String, String)> = sqlx::query_as("SELECT guid, name FROM hobbies")
        .fetch_all(pool)
        .await?;

    let ids: Vec<String> = names
        .into_iter()
        .filter(|(_, candidate)| candidate.to_lowercase() == wanted)
        .map(|(guid, _)| guid)
        .collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<HobbyRow> = sqlx::query_as(&format!(
        "SELECT {} FROM hobbies WHERE guid IN (SELECT value FROM json_each(?)) \
         ORDER BY created_at ASC, rowid ASC",
        HOBBY_COLUMNS
    ))
    .bind(Json(&ids))
    .fetch_all(pool)
    .await?;

    into_hobbies(rows)
}

pub async fn find_hobby(pool: &SqlitePool, id: Uuid) -> Result<Option<Hobby>> {
    let row: Option<HobbyRow> =
        sqlx::query_as(&format!("SELECT {} FROM hobbies WHERE guid = ?", HOBBY_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;

    row.map(Hobby::try_from).transpose()
}

/// Look up several hobbies at once; ids with no row are absent from the map
pub async fn find_hobbies_by_ids(pool: &SqlitePool, ids: &[Uuid]) -> Result<HashMap<Uuid, Hobby>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let ids: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    let rows: Vec<HobbyRow> = sqlx::query_as(&format!(
        "SELECT {} FROM hobbies WHERE guid IN (SELECT value FROM json_each(?))",
        HOBBY_COLUMNS
    ))
    .bind(Json(&ids))
    .fetch_all(pool)
    .await?;

    Ok(into_hobbies(rows)?
        .into_iter()
        .map(|hobby| (hobby.id, hobby))
        .collect())
}

pub async fn hobby_exists(pool: &SqlitePool, id: Uuid) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM hobbies WHERE guid = ?)")
        .bind(id.to_string())
        .fetch_one(pool)
        .await?;

    Ok(exists)
}

/// Insert a hobby as given (id and timestamps included)
pub async fn insert_hobby<'e, E>(executor: E, hobby: &Hobby) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO hobbies (guid, name, description, duration_options, location_options, tags,
            difficulty_levels, locations, equipment, cost_estimate, safety_notes,
            wheelchair_accessible, eco_friendly, mood_effects, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(hobby.id.to_string())
    .bind(&hobby.name)
    .bind(&hobby.description)
    .bind(Json(&hobby.duration_options))
    .bind(Json(&hobby.location_options))
    .bind(Json(&hobby.tags))
    .bind(Json(&hobby.difficulty_levels))
    .bind(Json(&hobby.locations))
    .bind(Json(&hobby.equipment))
    .bind(&hobby.cost_estimate)
    .bind(&hobby.safety_notes)
    .bind(hobby.wheelchair_accessible)
    .bind(hobby.eco_friendly)
    .bind(Json(&hobby.mood_effects))
    .bind(hobby.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn delete_all_hobbies<'e, E>(executor: E) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM hobbies").execute(executor).await?;
    Ok(result.rows_affected())
}

/// Random sample of at most `limit` hobbies matching `criteria`
pub async fn sample_hobbies(
    pool: &SqlitePool,
    criteria: &HobbyCriteria,
    limit: i64,
) -> Result<Vec<Hobby>> {
    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM hobbies WHERE 1 = 1", HOBBY_COLUMNS));

    if let Some(duration) = &criteria.duration {
        query
            .push(" AND EXISTS(SELECT 1 FROM json_each(hobbies.duration_options) WHERE value = ")
            .push_bind(duration.clone())
            .push(")");
    }
    if let Some(location) = &criteria.location {
        query
            .push(" AND EXISTS(SELECT 1 FROM json_each(hobbies.location_options) WHERE value = ")
            .push_bind(location.clone())
            .push(")");
    }
    if let Some(wheelchair) = criteria.wheelchair_accessible {
        query.push(" AND wheelchair_accessible = ").push_bind(wheelchair);
    }
    if let Some(eco) = criteria.eco_friendly {
        query.push(" AND eco_friendly = ").push_bind(eco);
    }
    if let Some(trial) = criteria.trial_available {
        // JSON booleans extract as 1/0
        query
            .push(" AND EXISTS(SELECT 1 FROM json_each(hobbies.locations) WHERE json_extract(value, '$.trialAvailable') = ")
            .push_bind(i64::from(trial))
            .push(")");
    }

    query.push(" ORDER BY RANDOM() LIMIT ").push_bind(limit);

    let rows: Vec<HobbyRow> = query.build_query_as().fetch_all(pool).await?;
    into_hobbies(rows)
}

/// Hobbies with an empty `moodEffects` list
pub async fn hobbies_missing_moods(pool: &SqlitePool, limit: i64) -> Result<Vec<Hobby>> {
    let rows: Vec<HobbyRow> = sqlx::query_as(&format!(
        "SELECT {} FROM hobbies WHERE json_array_length(mood_effects) = 0 ORDER BY rowid LIMIT ?",
        HOBBY_COLUMNS
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    into_hobbies(rows)
}

pub async fn count_missing_moods(pool: &SqlitePool) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM hobbies WHERE json_array_length(mood_effects) = 0")
            .fetch_one(pool)
            .await?;

    Ok(count)
}

pub async fn set_mood_effects<'e, E>(executor: E, id: Uuid, moods: &[Mood]) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE hobbies SET mood_effects = ? WHERE guid = ?")
        .bind(Json(moods))
        .bind(id.to_string())
        .execute(executor)
        .await?;

    Ok(())
}
