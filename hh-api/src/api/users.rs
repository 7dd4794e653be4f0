//! Account and profile endpoints

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use hh_common::auth::{hash_password, issue_token, verify_password};
use hh_common::db::{Preferences, PublicUser, User, UserHobby};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::auth::AuthUser;
use super::body::ApiJson;
use super::user_hobbies::{record_performance, NewPerformance};
use crate::error::{ApiError, ApiResult};
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub favourite_tags: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Partial profile update; empty strings count as absent
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub favourite_tags: Option<Vec<String>>,
    #[serde(default)]
    pub password: Option<String>,
    /// Replaces all three flags; omitted flags become false
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    pub hobby_id: String,
    pub performed_at: String,
    pub rating: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Profile with hobby history
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: PublicUser,
    pub hobby_history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub hobby_id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    pub duration: &'static str,
    pub rating: i64,
    pub notes: String,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Run bcrypt off the async executor
async fn hash_blocking(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("Hashing task failed: {}", e)))?
        .map_err(ApiError::from)
}

async fn verify_blocking(password: String, hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("Verification task failed: {}", e)))
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let (Some(name), Some(email), Some(password)) =
        (present(req.name), present(req.email), present(req.password))
    else {
        return Err(ApiError::BadRequest(
            "Name, email, and password are required.".to_string(),
        ));
    };

    let email = normalize_email(&email);
    if db::users::find_user_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::BadRequest("User already exists.".to_string()));
    }

    let password_hash = hash_blocking(password).await?;
    let favourite_tags = req.favourite_tags.unwrap_or_default();

    let user = db::users::insert_user(&state.db, name.trim(), &email, &password_hash, &favourite_tags)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                ApiError::BadRequest("User already exists.".to_string())
            } else {
                e.into()
            }
        })?;

    info!("Registered user {}", user.id);
    let token = issue_token(user.id, &state.jwt_secret)?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let (Some(email), Some(password)) = (present(req.email), req.password) else {
        return Err(invalid());
    };

    let Some(user) = db::users::find_user_by_email(&state.db, &normalize_email(&email)).await? else {
        warn!("Login for unknown email");
        return Err(invalid());
    };

    if !verify_blocking(password, user.password_hash.clone()).await? {
        warn!("Wrong password for user {}", user.id);
        return Err(invalid());
    }

    let token = issue_token(user.id, &state.jwt_secret)?;
    Ok(Json(TokenResponse { token }))
}

async fn load_profile(state: &AppState, user: &User) -> ApiResult<ProfileResponse> {
    let history = db::user_hobbies::history_for_user(&state.db, user.id).await?;

    let hobby_history = history
        .into_iter()
        .map(|row| HistoryEntry {
            id: row.guid,
            hobby_id: row.hobby_id,
            name: row.hobby_name.unwrap_or_else(|| "Unknown Hobby".to_string()),
            date: row.performed_at,
            duration: "N/A",
            rating: row.rating.unwrap_or(0),
            notes: row.notes.unwrap_or_default(),
        })
        .collect();

    Ok(ProfileResponse {
        user: PublicUser::from(user),
        hobby_history,
    })
}

/// GET /api/users, /api/users/profile, /api/users/current
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    Ok(Json(load_profile(&state, &user).await?))
}

/// PATCH /api/users, /api/users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(mut user): AuthUser,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    if let Some(name) = present(req.name) {
        user.name = name.trim().to_string();
    }

    if let Some(email) = present(req.email) {
        let email = normalize_email(&email);
        if email != user.email {
            if let Some(other) = db::users::find_user_by_email(&state.db, &email).await? {
                if other.id != user.id {
                    return Err(ApiError::Conflict("Email already in use".to_string()));
                }
            }
            user.email = email;
        }
    }

    if let Some(tags) = req.favourite_tags {
        user.favourite_tags = tags;
    }

    if let Some(preferences) = req.preferences {
        user.preferences = preferences;
    }

    if let Some(password) = present(req.password) {
        user.password_hash = hash_blocking(password).await?;
    }

    let updated = db::users::update_user(&state.db, &user)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                ApiError::Conflict("Email already in use".to_string())
            } else {
                e.into()
            }
        })?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!("Updated profile of user {}", updated.id);
    Ok(Json(load_profile(&state, &updated).await?))
}

/// POST /api/users/history
pub async fn add_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<HistoryRequest>,
) -> ApiResult<(StatusCode, Json<UserHobby>)> {
    let entry = record_performance(
        &state,
        NewPerformance {
            user: user.id,
            hobby: req.hobby_id,
            performed_at: req.performed_at,
            rating: Some(req.rating),
            notes: req.notes,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}
