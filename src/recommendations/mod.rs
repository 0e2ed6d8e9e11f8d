//! Smart suggestions for what to play next.
//!
//! Candidates are scored from four independent signals (similarity to the
//! current track, affinity with recent listening, fit with the usage
//! context, variety) and ranked by their weighted sum.

pub mod engine;
pub mod scoring;
pub mod types;

pub use engine::SuggestionEngine;
pub use types::{EnergyDirection, ScoreBreakdown, Suggestion, SuggestionContext};
