//! Data types for the suggestion system.

use serde::{Deserialize, Serialize};

use crate::models::Track;

/// What the listener is doing right now; biases context scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionContext {
    #[default]
    General,
    Workout,
    Focus,
    Party,
    Relaxing,
}

impl std::str::FromStr for SuggestionContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(SuggestionContext::General),
            "workout" => Ok(SuggestionContext::Workout),
            "focus" => Ok(SuggestionContext::Focus),
            "party" => Ok(SuggestionContext::Party),
            "relaxing" => Ok(SuggestionContext::Relaxing),
            _ => Err(format!(
                "Invalid context: '{}'. Valid: general, workout, focus, party, relaxing",
                s
            )),
        }
    }
}

/// Which way an energy transition should go from the current track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyDirection {
    Higher,
    Lower,
    Similar,
}

/// Sub-scores of a candidate, each already clamped to 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub similarity: f32,
    pub history_affinity: f32,
    pub context_fit: f32,
    pub variety_bonus: f32,
}

impl ScoreBreakdown {
    pub const SIMILARITY_WEIGHT: f32 = 0.3;
    pub const HISTORY_WEIGHT: f32 = 0.2;
    pub const CONTEXT_WEIGHT: f32 = 0.3;
    pub const VARIETY_WEIGHT: f32 = 0.2;

    pub fn total(&self) -> f32 {
        Self::SIMILARITY_WEIGHT * self.similarity
            + Self::HISTORY_WEIGHT * self.history_affinity
            + Self::CONTEXT_WEIGHT * self.context_fit
            + Self::VARIETY_WEIGHT * self.variety_bonus
    }
}

/// A ranked candidate.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub track: Track,
    pub score: f32,
}
