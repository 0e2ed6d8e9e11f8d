use serde::Serialize;
use std::time::Duration;

use crate::models::Track;
use crate::queue::PlaybackMode;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Previous restarts the current track instead once this much has played.
pub const PREVIOUS_RESTART_THRESHOLD: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Stopped,
    Error(String),
}

impl PlaybackState {
    /// States in which exactly one track is current.
    pub fn has_track(&self) -> bool {
        matches!(
            self,
            PlaybackState::Loading | PlaybackState::Playing | PlaybackState::Paused
        )
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::Playing)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PlaybackState::Error(_))
    }
}

/// Point-in-time copy of everything a UI needs to draw the transport.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    pub track: Option<Track>,
    pub elapsed: Duration,
    pub duration: Duration,
    pub volume: f32,
    pub queue_length: usize,
    pub queue_index: Option<usize>,
    pub mode: PlaybackMode,
}

impl PlaybackSnapshot {
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }
}
