use std::time::Duration;

use super::types::PlaybackState;
use crate::errors::{PlayerError, Result};
use crate::models::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; the tick was ignored.
    Ignored,
    Progressed,
    /// Elapsed reached the track duration.
    TrackEnded,
}

/// Lifecycle of the current track, without locking or side effects.
///
/// `AudioManager` owns one of these behind a lock and performs the device
/// calls and queue lookups around each transition.
#[derive(Debug, Clone, Default)]
pub struct PlaybackMachine {
    state: PlaybackState,
    track: Option<Track>,
    elapsed: Duration,
    duration: Duration,
    started: bool,
}

impl PlaybackMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Any state -> Loading with `track` current and elapsed reset.
    pub fn begin_load(&mut self, track: Track) {
        self.duration = track.duration;
        self.elapsed = Duration::ZERO;
        self.track = Some(track);
        self.started = false;
        self.state = PlaybackState::Loading;
    }

    /// True exactly once per load: the first time the track is playing.
    pub fn take_first_start(&mut self) -> bool {
        if self.state != PlaybackState::Playing || self.started {
            return false;
        }
        self.started = true;
        true
    }

    /// Loading -> Playing. Returns false from any other state.
    pub fn finish_load(&mut self) -> bool {
        if self.state != PlaybackState::Loading {
            return false;
        }
        self.state = PlaybackState::Playing;
        true
    }

    /// Loading -> Paused, for a track loaded without starting it.
    pub fn finish_load_paused(&mut self) -> bool {
        if self.state != PlaybackState::Loading {
            return false;
        }
        self.state = PlaybackState::Paused;
        true
    }

    /// Any state -> Error. The track is dropped; only a new load recovers.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.track = None;
        self.elapsed = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.state = PlaybackState::Error(message.into());
    }

    /// Paused/Loading -> Playing. No-op without a track or when already
    /// playing.
    pub fn play(&mut self) -> bool {
        if self.track.is_none() {
            return false;
        }
        match self.state {
            PlaybackState::Paused | PlaybackState::Loading => {
                self.state = PlaybackState::Playing;
                true
            }
            _ => false,
        }
    }

    pub fn pause(&mut self) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }
        self.state = PlaybackState::Paused;
        true
    }

    /// Any state -> Stopped, clearing the track. No-op when already stopped.
    pub fn stop(&mut self) -> bool {
        if self.state == PlaybackState::Stopped {
            return false;
        }
        self.track = None;
        self.elapsed = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.state = PlaybackState::Stopped;
        true
    }

    /// Stopped/Error -> Idle.
    pub fn reset(&mut self) -> bool {
        match self.state {
            PlaybackState::Stopped | PlaybackState::Error(_) => {
                self.track = None;
                self.elapsed = Duration::ZERO;
                self.duration = Duration::ZERO;
                self.state = PlaybackState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Move to `position`, clamped to the track duration. State is kept.
    pub fn seek(&mut self, position: Duration) -> Result<Duration> {
        if self.track.is_none() {
            return Err(PlayerError::NoCurrentTrack);
        }
        self.elapsed = position.min(self.duration);
        Ok(self.elapsed)
    }

    /// Back to the start of the current track, playing.
    pub fn restart(&mut self) -> bool {
        if self.track.is_none() {
            return false;
        }
        self.elapsed = Duration::ZERO;
        self.state = PlaybackState::Playing;
        true
    }

    pub fn advance(&mut self, delta: Duration) -> TickOutcome {
        if self.state != PlaybackState::Playing {
            return TickOutcome::Ignored;
        }
        self.elapsed = self.elapsed.saturating_add(delta);
        if self.elapsed >= self.duration {
            self.elapsed = self.duration;
            TickOutcome::TrackEnded
        } else {
            TickOutcome::Progressed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(secs: u64) -> Track {
        Track::new("t", "Title", "Artist", Duration::from_secs(secs))
    }

    fn playing(secs: u64) -> PlaybackMachine {
        let mut machine = PlaybackMachine::new();
        machine.begin_load(track(secs));
        assert!(machine.finish_load());
        machine
    }

    #[test]
    fn test_load_sets_duration_and_resets_elapsed() {
        let mut machine = playing(10);
        machine.advance(Duration::from_secs(4));
        machine.begin_load(track(20));
        assert_eq!(machine.state(), &PlaybackState::Loading);
        assert_eq!(machine.elapsed(), Duration::ZERO);
        assert_eq!(machine.duration(), Duration::from_secs(20));
    }

    #[test]
    fn test_play_without_track_is_noop() {
        let mut machine = PlaybackMachine::new();
        assert!(!machine.play());
        assert_eq!(machine.state(), &PlaybackState::Idle);
    }

    #[test]
    fn test_pause_twice_is_idempotent() {
        let mut machine = playing(10);
        machine.advance(Duration::from_secs(3));
        assert!(machine.pause());
        assert!(!machine.pause());
        assert_eq!(machine.state(), &PlaybackState::Paused);
        assert_eq!(machine.elapsed(), Duration::from_secs(3));

        // paused time does not advance
        assert_eq!(machine.advance(Duration::from_secs(1)), TickOutcome::Ignored);
        assert_eq!(machine.elapsed(), Duration::from_secs(3));

        assert!(machine.play());
        assert!(!machine.play());
    }

    #[test]
    fn test_stop_clears_and_is_idempotent() {
        let mut machine = playing(10);
        assert!(machine.stop());
        assert!(machine.track().is_none());
        assert_eq!(machine.elapsed(), Duration::ZERO);
        assert!(!machine.stop());
        assert!(!machine.play());
        assert!(machine.reset());
        assert_eq!(machine.state(), &PlaybackState::Idle);
    }

    #[test]
    fn test_seek_clamps() {
        let mut machine = playing(10);
        assert_eq!(machine.seek(Duration::from_secs(99)).unwrap(), Duration::from_secs(10));
        assert_eq!(machine.state(), &PlaybackState::Playing);

        let mut idle = PlaybackMachine::new();
        assert_eq!(idle.seek(Duration::from_secs(1)), Err(PlayerError::NoCurrentTrack));
    }

    #[test]
    fn test_advance_reports_end() {
        let mut machine = playing(10);
        machine.seek(Duration::from_secs_f64(9.95)).unwrap();
        assert_eq!(machine.advance(Duration::from_millis(100)), TickOutcome::TrackEnded);
        assert_eq!(machine.elapsed(), Duration::from_secs(10));
    }

    #[test]
    fn test_load_paused_keeps_position_at_zero() {
        let mut machine = PlaybackMachine::new();
        machine.begin_load(track(10));
        assert!(machine.finish_load_paused());
        assert_eq!(machine.state(), &PlaybackState::Paused);
        assert!(!machine.finish_load());
        assert_eq!(machine.advance(Duration::from_secs(1)), TickOutcome::Ignored);
        assert_eq!(machine.elapsed(), Duration::ZERO);

        assert!(!machine.take_first_start());
        assert!(machine.play());
        assert!(machine.take_first_start());
        machine.pause();
        machine.play();
        assert!(!machine.take_first_start());
    }

    #[test]
    fn test_fail_is_terminal_until_load() {
        let mut machine = playing(10);
        machine.fail("device gone");
        assert_eq!(machine.state(), &PlaybackState::Error("device gone".to_string()));
        assert!(!machine.play());
        assert!(!machine.restart());

        machine.begin_load(track(5));
        assert!(machine.finish_load());
        assert!(machine.state().is_playing());
    }
}
