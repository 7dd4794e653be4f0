//! Reminder queue endpoints
//!
//! The client schedules reminders here and polls `POST /api/reminders/due`
//! to pick up the ones whose time has come. Each claimed reminder is marked
//! delivered, so it is handed out once.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use hh_common::db::{Reminder, ReminderKind};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use super::auth::AuthUser;
use super::body::{ApiJson, ApiPath, OptionalApiJson};
use crate::error::{ApiError, ApiResult};
use crate::validation::parse_id;
use crate::{db, AppState};

/// Default delay before asking for a rating (two hours)
pub const RATING_DELAY_SECS: i64 = 7200;

/// Default delay before a nudge
pub const NUDGE_DELAY_SECS: i64 = 30;

/// Longest accepted delay (one week)
pub const MAX_DELAY_SECS: i64 = 7 * 24 * 60 * 60;

pub const RATING_TITLE: &str = "How was your hobby?";
pub const RATING_BODY: &str = "Please rate your experience with the hobby.";
pub const NUDGE_TITLE: &str = "Quick nudge";

pub const NUDGE_MESSAGES: [&str; 6] = [
    "Let’s try something creative today! 🎨",
    "Mini challenge: 10 mins of focused fun? 🎯",
    "How about a chill activity to reset? 🧊",
    "Feeling energetic? Try a quick burst! ⚡",
    "Call a friend and do something social? 🗣️",
    "Learn one new thing today. 🧠",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingReminderRequest {
    pub hobby_id: String,
    #[serde(default)]
    pub delay_seconds: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NudgeRequest {
    #[serde(default)]
    pub delay_seconds: Option<i64>,
}

/// Reminder plus the payload the client attaches to the notification
#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    #[serde(flatten)]
    pub reminder: Reminder,
    pub data: serde_json::Value,
}

impl From<Reminder> for ReminderResponse {
    fn from(reminder: Reminder) -> Self {
        let data = reminder.data();
        Self { reminder, data }
    }
}

fn delay(requested: Option<i64>, default: i64) -> ApiResult<Duration> {
    let secs = requested.unwrap_or(default);
    if !(1..=MAX_DELAY_SECS).contains(&secs) {
        return Err(ApiError::invalid_field(
            "delaySeconds",
            format!("Must be between 1 and {}", MAX_DELAY_SECS),
        ));
    }
    Ok(Duration::seconds(secs))
}

fn pick_nudge_message() -> &'static str {
    NUDGE_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(NUDGE_MESSAGES[0])
}

fn new_reminder(
    user: Uuid,
    hobby: Option<Uuid>,
    kind: ReminderKind,
    title: &str,
    body: &str,
    delay: Duration,
) -> Reminder {
    let now = Utc::now();
    Reminder {
        id: Uuid::new_v4(),
        user,
        hobby,
        kind,
        title: title.to_string(),
        body: body.to_string(),
        due_at: now + delay,
        delivered_at: None,
        created_at: now,
    }
}

/// POST /api/reminders/rating
pub async fn schedule_rating_reminder(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<RatingReminderRequest>,
) -> ApiResult<(StatusCode, Json<ReminderResponse>)> {
    let hobby = parse_id("hobbyId", &req.hobby_id)?;
    let delay = delay(req.delay_seconds, RATING_DELAY_SECS)?;

    if !db::hobbies::hobby_exists(&state.db, hobby).await? {
        return Err(ApiError::NotFound("Hobby not found".to_string()));
    }

    let reminder = new_reminder(
        user.id,
        Some(hobby),
        ReminderKind::Rating,
        RATING_TITLE,
        RATING_BODY,
        delay,
    );
    db::reminders::insert_reminder(&state.db, &reminder).await?;

    info!("Scheduled rating reminder {} due {}", reminder.id, reminder.due_at);
    Ok((StatusCode::CREATED, Json(reminder.into())))
}

/// POST /api/reminders/nudge
///
/// Replaces any nudge the user still has pending. The body is optional.
pub async fn schedule_nudge(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    OptionalApiJson(body): OptionalApiJson<NudgeRequest>,
) -> ApiResult<(StatusCode, Json<ReminderResponse>)> {
    let req = body.unwrap_or_default();
    let delay = delay(req.delay_seconds, NUDGE_DELAY_SECS)?;
    let message = pick_nudge_message();

    let nudge = new_reminder(user.id, None, ReminderKind::Nudge, NUDGE_TITLE, message, delay);
    let cancelled = db::reminders::replace_nudge(&state.db, &nudge).await?;

    info!(
        "Scheduled nudge {} due {} (replaced {})",
        nudge.id, nudge.due_at, cancelled
    );
    Ok((StatusCode::CREATED, Json(nudge.into())))
}

/// GET /api/reminders
pub async fn list_reminders(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<ReminderResponse>>> {
    let pending = db::reminders::list_pending(&state.db, user.id).await?;
    Ok(Json(pending.into_iter().map(ReminderResponse::from).collect()))
}

/// POST /api/reminders/due
pub async fn claim_due_reminders(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<ReminderResponse>>> {
    let claimed = db::reminders::claim_due(&state.db, user.id, Utc::now()).await?;
    debug!("User {} claimed {} due reminders", user.id, claimed.len());
    Ok(Json(claimed.into_iter().map(ReminderResponse::from).collect()))
}

/// DELETE /api/reminders/:id
pub async fn cancel_reminder(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id("id", &id)?;
    if !db::reminders::cancel(&state.db, user.id, id).await? {
        return Err(ApiError::NotFound("Reminder not found".to_string()));
    }

    info!("Cancelled reminder {}", id);
    Ok(StatusCode::NO_CONTENT)
}
