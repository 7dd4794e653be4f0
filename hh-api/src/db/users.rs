//! User account queries

use chrono::Utc;
use hh_common::db::{Preferences, User, UserRow};
use hh_common::Result;
use sqlx::{types::Json, SqlitePool};
use uuid::Uuid;

const USER_COLUMNS: &str = "guid, name, email, password_hash, favourite_tags, \
     pref_wheelchair_accessible, pref_eco_friendly, pref_trial_available, created_at, updated_at";

/// Insert a new user
///
/// `email` is stored as given; callers normalize it first.
pub async fn insert_user(
    pool: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    favourite_tags: &[String],
) -> Result<User> {
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash: password_hash.to_string(),
        favourite_tags: favourite_tags.to_vec(),
        preferences: Preferences::default(),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO users (guid, name, email, password_hash, favourite_tags,
            pref_wheelchair_accessible, pref_eco_friendly, pref_trial_available,
            created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(user.id.to_string())
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(Json(&user.favourite_tags))
    .bind(user.preferences.wheelchair_accessible)
    .bind(user.preferences.eco_friendly)
    .bind(user.preferences.trial_available)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await?;

    Ok(user)
}

pub async fn find_user_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {} FROM users WHERE guid = ?", USER_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(pool)
            .await?;

    row.map(User::try_from).transpose()
}

pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(pool)
            .await?;

    row.map(User::try_from).transpose()
}

/// Persist every mutable field of `user` and bump `updated_at`
///
/// Returns the stored user, or `None` if the row no longer exists.
pub async fn update_user(pool: &SqlitePool, user: &User) -> Result<Option<User>> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET name = ?, email = ?, password_hash = ?, favourite_tags = ?,
            pref_wheelchair_accessible = ?, pref_eco_friendly = ?, pref_trial_available = ?,
            updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(Json(&user.favourite_tags))
    .bind(user.preferences.wheelchair_accessible)
    .bind(user.preferences.eco_friendly)
    .bind(user.preferences.trial_available)
    .bind(Utc::now())
    .bind(user.id.to_string())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    find_user_by_id(pool, user.id).await
}
