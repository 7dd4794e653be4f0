//! Mood vocabulary
//!
//! Hobbies carry a list of moods describing how they tend to make people
//! feel. When a hobby is stored without moods they are inferred from its tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse mood tag attached to hobbies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Stressed,
    Energized,
    Creative,
    Relaxed,
    Neutral,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Stressed,
        Mood::Energized,
        Mood::Creative,
        Mood::Relaxed,
        Mood::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Stressed => "stressed",
            Mood::Energized => "energized",
            Mood::Creative => "creative",
            Mood::Relaxed => "relaxed",
            Mood::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| format!("Unknown mood: {}", s))
    }
}

const RELAXED_TAGS: &[&str] = &[
    "relaxation",
    "mindfulness",
    "wellness",
    "sustainability",
    "eco-friendly",
    "eco",
    "calm",
];

const CREATIVE_TAGS: &[&str] = &["creative", "expression", "hands-on", "craft", "art", "diy"];

const ENERGIZED_TAGS: &[&str] = &[
    "fitness",
    "adventure",
    "strength",
    "skill-building",
    "sport",
    "training",
];

/// Infer mood effects from a hobby's tags
///
/// Matching is case-insensitive on trimmed tags. Result order is fixed
/// (relaxed, creative, energized); falls back to `[Neutral]`.
pub fn infer_mood_effects<S: AsRef<str>>(tags: &[S]) -> Vec<Mood> {
    let normalized: Vec<String> = tags
        .iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .collect();
    let has_any = |group: &[&str]| normalized.iter().any(|t| group.contains(&t.as_str()));

    let mut moods = Vec::new();
    if has_any(RELAXED_TAGS) {
        moods.push(Mood::Relaxed);
    }
    if has_any(CREATIVE_TAGS) {
        moods.push(Mood::Creative);
    }
    if has_any(ENERGIZED_TAGS) {
        moods.push(Mood::Energized);
    }
    if moods.is_empty() {
        moods.push(Mood::Neutral);
    }
    moods
}
