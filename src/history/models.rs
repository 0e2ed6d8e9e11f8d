use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Mood, Track, TrackSource};

/// What the scorer needs to remember about a play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub track_id: String,
    pub artist: String,
    pub mood: Option<Mood>,
    pub genre: Option<String>,
    pub source: TrackSource,
    pub played_at: DateTime<Utc>,
}

impl From<&Track> for HistoryEntry {
    fn from(track: &Track) -> Self {
        Self {
            track_id: track.id.clone(),
            artist: track.artist.clone(),
            mood: track.mood,
            genre: track.genre.clone(),
            source: track.source,
            played_at: Utc::now(),
        }
    }
}
