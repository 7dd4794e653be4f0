//! Hobby recommendation engine
//!
//! # Pipeline
//!
//! 1. Build criteria from explicit query filters and, for signed-in users
//!    with at least one preference switched on, their preference defaults
//! 2. Sample up to [`SAMPLE_SIZE`] matching hobbies at random
//! 3. With `tryNew=true`, drop hobbies the user has already performed
//! 4. Stable sort by number of tags shared with the user's favourite tags
//! 5. Keep the first [`TOP_N`]

use std::collections::HashSet;

use hh_common::db::{Hobby, Preferences, User};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::db;

/// Hobbies drawn at random before ranking
pub const SAMPLE_SIZE: i64 = 10;

/// Suggestions returned to the client
pub const TOP_N: usize = 3;

/// Raw query string of `GET /api/hobbies/suggestions`
///
/// Flags stay strings: a present flag means `true` only when it is exactly
/// `"true"`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationFilters {
    pub duration: Option<String>,
    pub location: Option<String>,
    pub try_new: Option<String>,
    pub wheelchair_accessible: Option<String>,
    pub eco_friendly: Option<String>,
    pub trial_available: Option<String>,
}

impl RecommendationFilters {
    pub fn try_new(&self) -> bool {
        self.try_new.as_deref() == Some("true")
    }
}

/// Constraints applied when sampling hobbies; `None` leaves a field open
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HobbyCriteria {
    /// Hobby's `durationOptions` contains this value
    pub duration: Option<String>,
    /// Hobby's `locationOptions` contains this value
    pub location: Option<String>,
    pub wheelchair_accessible: Option<bool>,
    pub eco_friendly: Option<bool>,
    /// Some location of the hobby has `trialAvailable` equal to this value
    pub trial_available: Option<bool>,
}

fn explicit_flag(value: &Option<String>) -> Option<bool> {
    value.as_deref().map(|v| v == "true")
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_string)
}

/// Merge explicit filters with the user's preference defaults
///
/// An explicit filter always wins. A preference only fills in a missing
/// filter, and only when it is switched on and the user has at least one
/// preference enabled. Guests get explicit filters alone.
pub fn build_criteria(user: Option<&User>, filters: &RecommendationFilters) -> HobbyCriteria {
    let prefs = user
        .map(|u| u.preferences)
        .filter(|p| p.any_enabled());

    let with_default = |explicit: &Option<String>, pref: fn(&Preferences) -> bool| {
        explicit_flag(explicit).or_else(|| prefs.filter(pref).map(|_| true))
    };

    HobbyCriteria {
        duration: non_empty(&filters.duration),
        location: non_empty(&filters.location),
        wheelchair_accessible: with_default(&filters.wheelchair_accessible, |p| p.wheelchair_accessible),
        eco_friendly: with_default(&filters.eco_friendly, |p| p.eco_friendly),
        trial_available: with_default(&filters.trial_available, |p| p.trial_available),
    }
}

/// Remove hobbies the user has already performed
pub fn exclude_performed(hobbies: Vec<Hobby>, performed: &HashSet<Uuid>) -> Vec<Hobby> {
    hobbies
        .into_iter()
        .filter(|hobby| !performed.contains(&hobby.id))
        .collect()
}

/// Number of the hobby's tags that are among the favourites
pub fn tag_overlap(hobby: &Hobby, favourite_tags: &[String]) -> usize {
    hobby
        .tags
        .iter()
        .filter(|tag| favourite_tags.contains(tag))
        .count()
}

/// Order by descending tag overlap; equal scores keep their sampled order
pub fn rank(mut hobbies: Vec<Hobby>, favourite_tags: &[String]) -> Vec<Hobby> {
    hobbies.sort_by_key(|hobby| std::cmp::Reverse(tag_overlap(hobby, favourite_tags)));
    hobbies
}

/// Produce up to [`TOP_N`] suggestions for a user or guest
pub async fn recommend(
    pool: &SqlitePool,
    user: Option<&User>,
    filters: &RecommendationFilters,
) -> hh_common::Result<Vec<Hobby>> {
    debug!(
        user = ?user.map(|u| u.id),
        filters = ?filters,
        "Generating recommendations"
    );

    let criteria = build_criteria(user, filters);
    debug!(criteria = ?criteria, "Built hobby criteria");

    let mut hobbies = db::hobbies::sample_hobbies(pool, &criteria, SAMPLE_SIZE).await?;
    debug!(sampled = hobbies.len(), "Sampled hobbies");

    if let Some(user) = user.filter(|_| filters.try_new()) {
        let performed = db::user_hobbies::performed_hobby_ids(pool, user.id).await?;
        hobbies = exclude_performed(hobbies, &performed);
        debug!(remaining = hobbies.len(), "Excluded performed hobbies");
    }

    let favourite_tags: &[String] = user.map(|u| u.favourite_tags.as_slice()).unwrap_or(&[]);
    let mut ranked = rank(hobbies, favourite_tags);
    ranked.truncate(TOP_N);

    debug!(returned = ranked.len(), "Returning recommendations");
    Ok(ranked)
}
