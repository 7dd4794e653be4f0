//! HTTP API handlers for hh-api

pub mod auth;
pub mod body;
pub mod health;
pub mod hobbies;
pub mod reminders;
pub mod user_hobbies;
pub mod users;

pub use auth::{AuthUser, MaybeUser};
pub use health::{get_build_info, health_routes, BuildInfo};
pub use hobbies::{create_hobby, get_hobby, list_hobbies, suggestions};
pub use reminders::{
    cancel_reminder, claim_due_reminders, list_reminders, schedule_nudge, schedule_rating_reminder,
};
pub use user_hobbies::{create_user_hobby, list_user_hobbies};
pub use users::{add_history, get_profile, login, register, update_profile};

use crate::error::ApiError;

/// Fallback for unmatched paths
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
