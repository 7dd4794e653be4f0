//! Hobby history queries

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use hh_common::db::{UserHobby, UserHobbyRow};
use hh_common::Result;
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

const USER_HOBBY_COLUMNS: &str =
    "guid, user_id, hobby_id, performed_at, rating, notes, created_at, updated_at";

pub async fn insert_user_hobby<'e, E>(executor: E, entry: &UserHobby) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO user_hobbies (guid, user_id, hobby_id, performed_at, rating, notes,
            created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.id.to_string())
    .bind(entry.user.to_string())
    .bind(entry.hobby.to_string())
    .bind(entry.performed_at)
    .bind(entry.rating.map(i64::from))
    .bind(&entry.notes)
    .bind(entry.created_at)
    .bind(entry.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// A user's entries, most recent performance first
pub async fn list_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<UserHobby>> {
    let rows: Vec<UserHobbyRow> = sqlx::query_as(&format!(
        "SELECT {} FROM user_hobbies WHERE user_id = ? ORDER BY performed_at DESC, rowid DESC",
        USER_HOBBY_COLUMNS
    ))
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(UserHobby::try_from).collect()
}

/// Distinct hobbies the user has performed at least once
pub async fn performed_hobby_ids(pool: &SqlitePool, user_id: Uuid) -> Result<HashSet<Uuid>> {
    let ids: Vec<String> =
        sqlx::query_scalar("SELECT DISTINCT hobby_id FROM user_hobbies WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_all(pool)
            .await?;

    // Unparseable ids cannot match a hobby anyway
    Ok(ids.iter().filter_map(|id| Uuid::parse_str(id).ok()).collect())
}

/// History entry joined with the hobby name (absent if the hobby was deleted)
#[derive(Debug, sqlx::FromRow)]
pub struct HistoryRow {
    pub guid: String,
    pub hobby_id: String,
    pub hobby_name: Option<String>,
    pub performed_at: DateTime<Utc>,
    pub rating: Option<i64>,
    pub notes: Option<String>,
}

pub async fn history_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<HistoryRow>> {
    let rows: Vec<HistoryRow> = sqlx::query_as(
        r#"
        SELECT uh.guid, uh.hobby_id, h.name AS hobby_name, uh.performed_at, uh.rating, uh.notes
        FROM user_hobbies uh
        LEFT JOIN hobbies h ON h.guid = uh.hobby_id
        WHERE uh.user_id = ?
        ORDER BY uh.performed_at DESC, uh.rowid DESC
        "#,
    )
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn delete_all_user_hobbies<'e, E>(executor: E) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM user_hobbies").execute(executor).await?;
    Ok(result.rows_affected())
}
