//! Hobby history endpoints
//!
//! Every entry belongs to the caller: creating or listing entries for another
//! user is forbidden.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use hh_common::db::{Hobby, UserHobby};
use hh_common::time::parse_timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::auth::AuthUser;
use super::body::{ApiJson, ApiPath};
use crate::error::{ApiError, ApiResult};
use crate::validation::{parse_id, Validator};
use crate::{db, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserHobbyRequest {
    pub user: String,
    pub hobby: String,
    pub performed_at: String,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// History entry with its hobby resolved
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedUserHobby {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: Uuid,
    pub hobby_id: Uuid,
    /// `None` once the hobby has been deleted
    pub hobby: Option<Hobby>,
    pub performed_at: DateTime<Utc>,
    pub rating: Option<u8>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated input for a new history entry
#[derive(Debug)]
pub struct NewPerformance {
    pub user: Uuid,
    pub hobby: String,
    pub performed_at: String,
    pub rating: Option<i64>,
    pub notes: Option<String>,
}

/// Validate and store one performance of a hobby
///
/// The hobby must exist; the entry is stored for `new.user` as given, so
/// callers check ownership first.
pub async fn record_performance(state: &AppState, new: NewPerformance) -> ApiResult<UserHobby> {
    let mut v = Validator::new();

    let hobby = Uuid::parse_str(new.hobby.trim()).ok();
    v.check(hobby.is_some(), "hobby", "Invalid hobby id");

    let performed_at = parse_timestamp(&new.performed_at);
    v.check(
        performed_at.is_some(),
        "performedAt",
        "Expected an RFC 3339 timestamp or YYYY-MM-DD date",
    );

    if let Some(rating) = new.rating {
        v.check((1..=5).contains(&rating), "rating", "Rating must be between 1 and 5");
    }

    v.finish()?;
    let (Some(hobby), Some(performed_at)) = (hobby, performed_at) else {
        return Err(ApiError::BadRequest("Invalid hobby entry".to_string()));
    };

    if !db::hobbies::hobby_exists(&state.db, hobby).await? {
        return Err(ApiError::NotFound("Hobby not found".to_string()));
    }

    let now = Utc::now();
    let entry = UserHobby {
        id: Uuid::new_v4(),
        user: new.user,
        hobby,
        performed_at,
        rating: new.rating.and_then(|r| u8::try_from(r).ok()),
        notes: new.notes,
        created_at: now,
        updated_at: now,
    };

    db::user_hobbies::insert_user_hobby(&state.db, &entry).await?;
    info!("User {} performed hobby {}", entry.user, entry.hobby);
    Ok(entry)
}

/// POST /api/user-hobbies
pub async fn create_user_hobby(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ApiJson(req): ApiJson<CreateUserHobbyRequest>,
) -> ApiResult<(StatusCode, Json<UserHobby>)> {
    let user = parse_id("user", &req.user)?;
    if user != caller.id {
        return Err(ApiError::Forbidden(
            "Cannot record hobbies for another user".to_string(),
        ));
    }

    let entry = record_performance(
        &state,
        NewPerformance {
            user,
            hobby: req.hobby,
            performed_at: req.performed_at,
            rating: req.rating,
            notes: req.notes,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/user-hobbies/:user_id
pub async fn list_user_hobbies(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    ApiPath(user_id): ApiPath<String>,
) -> ApiResult<Json<Vec<PopulatedUserHobby>>> {
    let user_id = parse_id("userId", &user_id)?;
    if user_id != caller.id {
        return Err(ApiError::Forbidden(
            "Cannot view another user's hobbies".to_string(),
        ));
    }

    let entries = db::user_hobbies::list_for_user(&state.db, user_id).await?;
    let hobby_ids: Vec<Uuid> = entries.iter().map(|e| e.hobby).collect();
    let hobbies = db::hobbies::find_hobbies_by_ids(&state.db, &hobby_ids).await?;
    debug!(entries = entries.len(), hobbies = hobbies.len(), "Listing user hobbies");

    let populated = entries
        .into_iter()
        .map(|entry| PopulatedUserHobby {
            id: entry.id,
            user: entry.user,
            hobby_id: entry.hobby,
            hobby: hobbies.get(&entry.hobby).cloned(),
            performed_at: entry.performed_at,
            rating: entry.rating,
            notes: entry.notes,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        })
        .collect();

    Ok(Json(populated))
}
