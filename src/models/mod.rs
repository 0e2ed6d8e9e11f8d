use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use std::time::Duration;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackSource {
    Local,
    Tidal,
    Subsonic,
}

impl From<String> for TrackSource {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "TIDAL" => TrackSource::Tidal,
            "SUBSONIC" => TrackSource::Subsonic,
            _ => TrackSource::Local,
        }
    }
}

impl std::fmt::Display for TrackSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackSource::Tidal => write!(f, "TIDAL"),
            TrackSource::Subsonic => write!(f, "SUBSONIC"),
            TrackSource::Local => write!(f, "LOCAL"),
        }
    }
}

impl TrackSource {
    pub fn is_streaming(&self) -> bool {
        matches!(self, TrackSource::Tidal | TrackSource::Subsonic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Energetic,
    Upbeat,
    Chill,
    Focus,
    Relaxing,
    Party,
    Melancholic,
    Romantic,
}

impl std::str::FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "energetic" => Ok(Mood::Energetic),
            "upbeat" => Ok(Mood::Upbeat),
            "chill" => Ok(Mood::Chill),
            "focus" => Ok(Mood::Focus),
            "relaxing" => Ok(Mood::Relaxing),
            "party" => Ok(Mood::Party),
            "melancholic" => Ok(Mood::Melancholic),
            "romantic" => Ok(Mood::Romantic),
            _ => Err(format!("Invalid mood: {}", s)),
        }
    }
}

/// A playable item. Two tracks are equal when their ids match, whatever
/// the rest of their metadata says.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration: Duration,
    #[serde(rename = "cover_image")]
    pub cover_url: Option<String>,
    /// Where the audio device should load audio from (file path or stream url)
    pub audio_url: Option<String>,
    pub source: TrackSource,

    // Scorer features
    pub energy: Option<f32>,
    pub mood: Option<Mood>,
    pub genre: Option<String>,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            duration,
            cover_url: None,
            audio_url: None,
            source: TrackSource::Local,
            energy: None,
            mood: None,
            genre: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_source(mut self, source: TrackSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_cover(mut self, url: impl Into<String>) -> Self {
        self.cover_url = Some(url.into());
        self
    }

    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = Some(url.into());
        self
    }

    /// Energy outside 0.0..=1.0 is clamped; NaN is dropped.
    pub fn with_energy(mut self, energy: f32) -> Self {
        self.energy = if energy.is_nan() {
            None
        } else {
            Some(energy.clamp(0.0, 1.0))
        };
        self
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Locator handed to the audio device. Falls back to the track id.
    pub fn locator(&self) -> &str {
        self.audio_url.as_deref().unwrap_or(&self.id)
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
