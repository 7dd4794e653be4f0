//! Hobby catalogue and suggestion endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use chrono::Utc;
use hh_common::db::{DifficultyLevel, Hobby, HobbyLocation};
use hh_common::mood::infer_mood_effects;
use hh_common::Mood;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::auth::{AuthUser, MaybeUser};
use super::body::{ApiJson, ApiPath, ApiQuery};
use crate::error::{ApiError, ApiResult};
use crate::recommend::{self, RecommendationFilters};
use crate::validation::{is_http_url, parse_id, Validator};
use crate::{db, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub name: Option<String>,
}

/// Body of `POST /api/hobbies`
///
/// Only name, description and tags are required; everything else has a
/// default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateHobbyRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration_options: Option<Vec<String>>,
    #[serde(default)]
    pub location_options: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub difficulty_levels: Option<Vec<DifficultyLevel>>,
    #[serde(default)]
    pub locations: Option<Vec<HobbyLocation>>,
    #[serde(default)]
    pub equipment: Option<Vec<String>>,
    #[serde(default)]
    pub cost_estimate: Option<String>,
    #[serde(default)]
    pub safety_notes: Option<String>,
    #[serde(default)]
    pub wheelchair_accessible: Option<bool>,
    #[serde(default)]
    pub eco_friendly: Option<bool>,
    #[serde(default)]
    pub mood_effects: Option<Vec<Mood>>,
}

impl CreateHobbyRequest {
    fn validate(&self) -> ApiResult<()> {
        let mut v = Validator::new();

        v.min_chars(&self.name, 2, "name");
        v.min_chars(&self.description, 10, "description");
        v.check(!self.tags.is_empty(), "tags", "At least one tag is required");

        for (i, level) in self.difficulty_levels.iter().flatten().enumerate() {
            v.min_chars(&level.level, 3, &format!("difficultyLevels[{}].level", i));
            for (j, link) in level.youtube_links.iter().enumerate() {
                v.check(
                    is_http_url(link),
                    format!("difficultyLevels[{}].youtubeLinks[{}]", i, j),
                    "Must be an http(s) URL",
                );
            }
        }

        for (i, location) in self.locations.iter().flatten().enumerate() {
            v.min_chars(&location.name, 1, &format!("locations[{}].name", i));
        }

        v.finish()
    }

    fn into_hobby(self) -> Hobby {
        let difficulty_levels = self.difficulty_levels.unwrap_or_else(|| {
            vec![DifficultyLevel {
                level: "Beginner".to_string(),
                youtube_links: Vec::new(),
            }]
        });
        let mood_effects = self
            .mood_effects
            .unwrap_or_else(|| infer_mood_effects(&self.tags));

        Hobby {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            duration_options: self.duration_options.unwrap_or_default(),
            location_options: self.location_options.unwrap_or_default(),
            tags: self.tags,
            difficulty_levels,
            locations: self.locations.unwrap_or_default(),
            equipment: self.equipment.unwrap_or_default(),
            cost_estimate: self.cost_estimate.unwrap_or_default(),
            safety_notes: self.safety_notes.unwrap_or_default(),
            wheelchair_accessible: self.wheelchair_accessible.unwrap_or(false),
            eco_friendly: self.eco_friendly.unwrap_or(false),
            mood_effects,
            created_at: Utc::now(),
        }
    }
}

fn hobby_not_found() -> ApiError {
    ApiError::NotFound("Hobby not found".to_string())
}

/// GET /api/hobbies
///
/// With `?name=`, case-insensitive exact match on the name.
pub async fn list_hobbies(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<Hobby>>> {
    match query.name.filter(|n| !n.is_empty()) {
        Some(name) => {
            debug!("Looking up hobby by name: {:?}", name);
            let hobbies = db::hobbies::find_hobbies_by_name(&state.db, &name).await?;
            if hobbies.is_empty() {
                return Err(hobby_not_found());
            }
            Ok(Json(hobbies))
        }
        None => Ok(Json(db::hobbies::list_hobbies(&state.db).await?)),
    }
}

/// GET /api/hobbies/suggestions
pub async fn suggestions(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    ApiQuery(filters): ApiQuery<RecommendationFilters>,
) -> ApiResult<Json<Vec<Hobby>>> {
    let hobbies = recommend::recommend(&state.db, user.as_ref(), &filters).await?;
    Ok(Json(hobbies))
}

/// GET /api/hobbies/:id
pub async fn get_hobby(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Hobby>> {
    let id = parse_id("id", &id)?;
    db::hobbies::find_hobby(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(hobby_not_found)
}

/// POST /api/hobbies
pub async fn create_hobby(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(req): ApiJson<CreateHobbyRequest>,
) -> ApiResult<(StatusCode, Json<Hobby>)> {
    req.validate()?;

    let hobby = req.into_hobby();
    db::hobbies::insert_hobby(&state.db, &hobby).await?;

    info!("User {} created hobby {} ({})", user.id, hobby.id, hobby.name);
    Ok((StatusCode::CREATED, Json(hobby)))
}
