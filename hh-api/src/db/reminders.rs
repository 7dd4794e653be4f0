//! Reminder queue queries

use chrono::{DateTime, Utc};
use hh_common::db::{Reminder, ReminderRow};
use hh_common::Result;
use sqlx::{Executor, Sqlite, SqlitePool};
use uuid::Uuid;

const REMINDER_COLUMNS: &str =
    "guid, user_id, hobby_id, kind, title, body, due_at, delivered_at, created_at";

pub async fn insert_reminder<'e, E>(executor: E, reminder: &Reminder) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO reminders (guid, user_id, hobby_id, kind, title, body, due_at,
            delivered_at, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(reminder.id.to_string())
    .bind(reminder.user.to_string())
    .bind(reminder.hobby.map(|h| h.to_string()))
    .bind(reminder.kind.as_str())
    .bind(&reminder.title)
    .bind(&reminder.body)
    .bind(reminder.due_at)
    .bind(reminder.delivered_at)
    .bind(reminder.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Drop the user's undelivered nudges
pub async fn cancel_pending_nudges<'e, E>(executor: E, user_id: Uuid) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "DELETE FROM reminders WHERE user_id = ? AND kind = 'nudge' AND delivered_at IS NULL",
    )
    .bind(user_id.to_string())
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Replace any pending nudge of the user with `nudge`, atomically
pub async fn replace_nudge(pool: &SqlitePool, nudge: &Reminder) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let cancelled = cancel_pending_nudges(&mut *tx, nudge.user).await?;
    insert_reminder(&mut *tx, nudge).await?;
    tx.commit().await?;

    Ok(cancelled)
}

/// Undelivered reminders, soonest first
pub async fn list_pending(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Reminder>> {
    let rows: Vec<ReminderRow> = sqlx::query_as(&format!(
        "SELECT {} FROM reminders WHERE user_id = ? AND delivered_at IS NULL ORDER BY due_at ASC",
        REMINDER_COLUMNS
    ))
    .bind(user_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Reminder::try_from).collect()
}

/// Mark every due, undelivered reminder of the user as delivered and return them
///
/// A single UPDATE claims the rows, so concurrent claims never return the
/// same reminder twice.
pub async fn claim_due(pool: &SqlitePool, user_id: Uuid, now: DateTime<Utc>) -> Result<Vec<Reminder>> {
    let rows: Vec<ReminderRow> = sqlx::query_as(&format!(
        r#"
        UPDATE reminders SET delivered_at = ?
        WHERE user_id = ? AND delivered_at IS NULL AND due_at <= ?
        RETURNING {}
        "#,
        REMINDER_COLUMNS
    ))
    .bind(now)
    .bind(user_id.to_string())
    .bind(now)
    .fetch_all(pool)
    .await?;

    let mut reminders = rows
        .into_iter()
        .map(Reminder::try_from)
        .collect::<Result<Vec<_>>>()?;
    reminders.sort_by_key(|r| r.due_at);
    Ok(reminders)
}

/// Delete a pending reminder owned by the user
///
/// Returns false when no such pending reminder exists.
pub async fn cancel(pool: &SqlitePool, user_id: Uuid, id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        "DELETE FROM reminders WHERE guid = ? AND user_id = ? AND delivered_at IS NULL",
    )
    .bind(id.to_string())
    .bind(user_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
