use parking_lot::Mutex;
use std::time::Duration;

use crate::errors::Result;

/// Output device driven by the playback controller.
///
/// Decoding and hardware output live behind this trait. When a device
/// finishes a track on its own it should call
/// [`AudioManager::on_track_finished`](super::AudioManager::on_track_finished).
pub trait AudioDevice: Send + Sync {
    fn load(&self, locator: &str) -> Result<()>;
    fn play(&self) -> Result<()>;
    fn pause(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;
    fn seek(&self, position: Duration) -> Result<()>;
    fn set_volume(&self, volume: f32) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
struct NullDeviceState {
    locator: Option<String>,
    playing: bool,
    position: Duration,
    volume: f32,
}

/// Device that produces no sound. Track ends are estimated from track
/// durations by the progress clock.
#[derive(Debug, Default)]
pub struct NullDevice {
    state: Mutex<NullDeviceState>,
}

impl NullDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded(&self) -> Option<String> {
        self.state.lock().locator.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn position(&self) -> Duration {
        self.state.lock().position
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }
}

impl AudioDevice for NullDevice {
    fn load(&self, locator: &str) -> Result<()> {
        log::debug!("[NullDevice] Load {}", locator);
        let mut state = self.state.lock();
        state.locator = Some(locator.to_string());
        state.position = Duration::ZERO;
        state.playing = false;
        Ok(())
    }

    fn play(&self) -> Result<()> {
        self.state.lock().playing = true;
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        self.state.lock().playing = false;
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.playing = false;
        state.locator = None;
        state.position = Duration::ZERO;
        Ok(())
    }

    fn seek(&self, position: Duration) -> Result<()> {
        self.state.lock().position = position;
        Ok(())
    }

    fn set_volume(&self, volume: f32) -> Result<()> {
        self.state.lock().volume = volume;
        Ok(())
    }
}
