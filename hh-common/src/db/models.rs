//! Database models
//!
//! Domain types serialize with camelCase field names, the shape the mobile
//! client consumes. `*Row` types mirror table columns and convert into the
//! domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

use crate::{Error, Mood, Result};

fn parse_guid(column: &str, value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| Error::Internal(format!("Corrupt {} '{}': {}", column, value, e)))
}

// ========================================
// Users
// ========================================

/// Per-user default filters for suggestions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub wheelchair_accessible: bool,
    #[serde(default)]
    pub eco_friendly: bool,
    #[serde(default)]
    pub trial_available: bool,
}

impl Preferences {
    /// True when at least one preference is switched on
    pub fn any_enabled(&self) -> bool {
        self.wheelchair_accessible || self.eco_friendly || self.trial_available
    }
}

/// Stored user, including the password hash
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub favourite_tags: Vec<String>,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User as returned by the API (never carries the password hash)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub favourite_tags: Vec<String>,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            favourite_tags: user.favourite_tags.clone(),
            preferences: user.preferences,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub guid: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub favourite_tags: Json<Vec<String>>,
    pub pref_wheelchair_accessible: bool,
    pub pref_eco_friendly: bool,
    pub pref_trial_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(Self {
            id: parse_guid("users.guid", &row.guid)?,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            favourite_tags: row.favourite_tags.0,
            preferences: Preferences {
                wheelchair_accessible: row.pref_wheelchair_accessible,
                eco_friendly: row.pref_eco_friendly,
                trial_available: row.pref_trial_available,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ========================================
// Hobbies
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyLevel {
    pub level: String,
    #[serde(default)]
    pub youtube_links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HobbyLocation {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub trial_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hobby {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub duration_options: Vec<String>,
    pub location_options: Vec<String>,
    pub tags: Vec<String>,
    pub difficulty_levels: Vec<DifficultyLevel>,
    pub locations: Vec<HobbyLocation>,
    pub equipment: Vec<String>,
    pub cost_estimate: String,
    pub safety_notes: String,
    pub wheelchair_accessible: bool,
    pub eco_friendly: bool,
    pub mood_effects: Vec<Mood>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct HobbyRow {
    pub guid: String,
    pub name: String,
    pub description: String,
    pub duration_options: Json<Vec<String>>,
    pub location_options: Json<Vec<String>>,
    pub tags: Json<Vec<String>>,
    pub difficulty_levels: Json<Vec<DifficultyLevel>>,
    pub locations: Json<Vec<HobbyLocation>>,
    pub equipment: Json<Vec<String>>,
    pub cost_estimate: String,
    pub safety_notes: String,
    pub wheelchair_accessible: bool,
    pub eco_friendly: bool,
    pub mood_effects: Json<Vec<Mood>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<HobbyRow> for Hobby {
    type Error = Error;

    fn try_from(row: HobbyRow) -> Result<Self> {
        Ok(Self {
            id: parse_guid("hobbies.guid", &row.guid)?,
            name: row.name,
            description: row.description,
            duration_options: row.duration_options.0,
            location_options: row.location_options.0,
            tags: row.tags.0,
            difficulty_levels: row.difficulty_levels.0,
            locations: row.locations.0,
            equipment: row.equipment.0,
            cost_estimate: row.cost_estimate,
            safety_notes: row.safety_notes,
            wheelchair_accessible: row.wheelchair_accessible,
            eco_friendly: row.eco_friendly,
            mood_effects: row.mood_effects.0,
            created_at: row.created_at,
        })
    }
}

// ========================================
// User hobby history
// ========================================

/// One performance of a hobby by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHobby {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: Uuid,
    pub hobby: Uuid,
    pub performed_at: DateTime<Utc>,
    pub rating: Option<u8>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct UserHobbyRow {
    pub guid: String,
    pub user_id: String,
    pub hobby_id: String,
    pub performed_at: DateTime<Utc>,
    pub rating: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserHobbyRow> for UserHobby {
    type Error = Error;

    fn try_from(row: UserHobbyRow) -> Result<Self> {
        Ok(Self {
            id: parse_guid("user_hobbies.guid", &row.guid)?,
            user: parse_guid("user_hobbies.user_id", &row.user_id)?,
            hobby: parse_guid("user_hobbies.hobby_id", &row.hobby_id)?,
            performed_at: row.performed_at,
            rating: row.rating.and_then(|r| u8::try_from(r).ok()),
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ========================================
// Reminders
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Rating,
    Nudge,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::Rating => "rating",
            ReminderKind::Nudge => "nudge",
        }
    }

    fn parse(s: &str) -> Result<Self> {
        match s {
            "rating" => Ok(ReminderKind::Rating),
            "nudge" => Ok(ReminderKind::Nudge),
            other => Err(Error::Internal(format!("Corrupt reminders.kind '{}'", other))),
        }
    }
}

/// A scheduled notification the client claims once due
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: Uuid,
    pub hobby: Option<Uuid>,
    pub kind: ReminderKind,
    pub title: String,
    pub body: String,
    pub due_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Reminder {
    /// Notification payload handed to the client's tap handler
    pub fn data(&self) -> serde_json::Value {
        match self.hobby {
            Some(hobby) => serde_json::json!({ "type": self.kind, "hobbyId": hobby }),
            None => serde_json::json!({ "type": self.kind }),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct ReminderRow {
    pub guid: String,
    pub user_id: String,
    pub hobby_id: Option<String>,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub due_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ReminderRow> for Reminder {
    type Error = Error;

    fn try_from(row: ReminderRow) -> Result<Self> {
        Ok(Self {
            id: parse_guid("reminders.guid", &row.guid)?,
            user: parse_guid("reminders.user_id", &row.user_id)?,
            hobby: row
                .hobby_id
                .as_deref()
                .map(|h| parse_guid("reminders.hobby_id", h))
                .transpose()?,
            kind: ReminderKind::parse(&row.kind)?,
            title: row.title,
            body: row.body,
            due_at: row.due_at,
            delivered_at: row.delivered_at,
            created_at: row.created_at,
        })
    }
}
