use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::config::PlayerConfig;
use crate::errors::{PlayerError, Result};
use crate::models::Track;
use crate::playback_notifier::{PlaybackEvent, PlaybackNotifier};
use crate::queue::{PlayQueue, PlaybackMode, QueueChange};

use super::clock::{self, ClockHandle};
use super::device::AudioDevice;
use super::machine::{PlaybackMachine, TickOutcome};
use super::types::{PlaybackSnapshot, PlaybackState};

type Events = Vec<PlaybackEvent>;

/// Playback controller: queue, state machine, device and progress clock.
///
/// Every mutating command runs under `command_lock`, so commands apply one
/// at a time. The queue and machine locks are taken one after the other and
/// never together.
///
/// Events are collected while mutating and posted to the outbox before
/// `command_lock` is released, so the outbox holds them in mutation order.
/// They are handed to the notifier after the lock is gone, by whichever
/// thread wins `dispatch_lock`. An observer may therefore issue commands
/// from `on_event`; the events of such a nested command are delivered right
/// after the event being handled has reached every subscriber.
pub struct AudioManager {
    command_lock: Mutex<()>,
    dispatch_lock: Mutex<()>,
    outbox: Sender<PlaybackEvent>,
    pending: Receiver<PlaybackEvent>,
    queue: RwLock<PlayQueue>,
    machine: RwLock<PlaybackMachine>,
    device: Arc<dyn AudioDevice>,
    notifier: Arc<PlaybackNotifier>,
    volume: AtomicU32,
    clock: Mutex<Option<ClockHandle>>,
    tick_interval: Option<Duration>,
    clear_queue_on_exhaustion: bool,
    previous_restart_threshold: Duration,
    self_ref: Weak<AudioManager>,
}

impl AudioManager {
    pub fn new(
        device: Arc<dyn AudioDevice>,
        notifier: Arc<PlaybackNotifier>,
        config: &PlayerConfig,
    ) -> Arc<Self> {
        Self::with_queue(device, notifier, config, PlayQueue::new())
    }

    pub fn with_queue(
        device: Arc<dyn AudioDevice>,
        notifier: Arc<PlaybackNotifier>,
        config: &PlayerConfig,
        queue: PlayQueue,
    ) -> Arc<Self> {
        let config = config.clone().sanitized();
        if let Err(e) = device.set_volume(config.initial_volume) {
            log::warn!("[AudioManager] Failed to apply initial volume: {}", e);
        }
        let (outbox, pending) = crossbeam_channel::unbounded();

        Arc::new_cyclic(|self_ref| Self {
            command_lock: Mutex::new(()),
            dispatch_lock: Mutex::new(()),
            outbox,
            pending,
            queue: RwLock::new(queue),
            machine: RwLock::new(PlaybackMachine::new()),
            device,
            notifier,
            volume: AtomicU32::new(config.initial_volume.to_bits()),
            clock: Mutex::new(None),
            tick_interval: config.tick_interval(),
            clear_queue_on_exhaustion: config.clear_queue_on_exhaustion,
            previous_restart_threshold: config.previous_restart_threshold(),
            self_ref: self_ref.clone(),
        })
    }

    pub fn notifier(&self) -> &Arc<PlaybackNotifier> {
        &self.notifier
    }

    // ---- Reads ----

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let (state, track, elapsed, duration) = {
            let machine = self.machine.read();
            (
                machine.state().clone(),
                machine.track().cloned(),
                machine.elapsed(),
                machine.duration(),
            )
        };
        let (queue_length, queue_index, mode) = {
            let queue = self.queue.read();
            (queue.len(), queue.current_index(), queue.mode())
        };

        PlaybackSnapshot {
            state,
            track,
            elapsed,
            duration,
            volume: self.volume(),
            queue_length,
            queue_index,
            mode,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.machine.read().state().clone()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.machine.read().track().cloned()
    }

    pub fn elapsed(&self) -> Duration {
        self.machine.read().elapsed()
    }

    pub fn queue_tracks(&self) -> Vec<Track> {
        self.queue.read().tracks().to_vec()
    }

    pub fn queue_index(&self) -> Option<usize> {
        self.queue.read().current_index()
    }

    pub fn mode(&self) -> PlaybackMode {
        self.queue.read().mode()
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    pub fn is_clock_running(&self) -> bool {
        self.clock
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_cancelled())
    }

    // ---- Queue commands ----

    /// Replace the queue and start playing at `start_index` (clamped).
    /// An empty list stops playback.
    pub fn set_queue(&self, tracks: Vec<Track>, start_index: usize) {
        self.command(|events| {
            let selected = self.queue.write().set_queue(tracks, start_index);
            events.push(self.queue_event());

            match selected {
                Some(track) => self.load_locked(track, true, events),
                None => self.stop_locked(events),
            }
        })
    }

    pub fn insert(&self, track: Track, at: usize) -> usize {
        self.command(|events| {
            let index = self.queue.write().insert(track, at);
            events.push(self.queue_event());
            index
        })
    }

    pub fn push(&self, track: Track) -> usize {
        self.command(|events| {
            let index = self.queue.write().push(track);
            events.push(self.queue_event());
            index
        })
    }

    pub fn insert_next(&self, track: Track) -> usize {
        self.command(|events| {
            let index = self.queue.write().insert_next(track);
            events.push(self.queue_event());
            index
        })
    }

    /// Remove the entry at `index`.
    ///
    /// Removing the current entry while something is loaded loads its
    /// replacement. A paused player loads it without starting it. Removing
    /// the last entry stops playback.
    pub fn remove_at(&self, index: usize) -> Result<Track> {
        self.command(|events| {
            let (removed, change) = self.queue.write().remove_at(index)?;
            events.push(self.queue_event());
            log::debug!("[AudioManager] Removed '{}' ({:?})", removed.title, change);

            match change {
                QueueChange::Unchanged => {}
                QueueChange::Emptied => self.stop_locked(events),
                QueueChange::CurrentReplaced(track) => {
                    let state = self.machine.read().state().clone();
                    if state.has_track() {
                        let autoplay = state != PlaybackState::Paused;
                        self.load_locked(track, autoplay, events);
                    }
                }
            }
            Ok(removed)
        })
    }

    pub fn move_track(&self, from: usize, to: usize) -> Result<()> {
        self.command(|events| {
            self.queue.write().move_track(from, to)?;
            events.push(self.queue_event());
            Ok(())
        })
    }

    pub fn shuffle(&self) {
        self.command(|events| {
            self.queue.write().shuffle();
            events.push(self.queue_event());
        })
    }

    /// Empty the queue. The loaded track keeps playing to its end.
    pub fn clear_queue(&self) {
        self.command(|events| {
            self.queue.write().clear();
            events.push(self.queue_event());
        })
    }

    pub fn set_mode(&self, mode: PlaybackMode) {
        self.command(|events| {
            self.queue.write().set_mode(mode);
            events.push(self.queue_event());
        })
    }

    /// Jump to queue entry `index` and play it.
    pub fn select(&self, index: usize) -> Result<Track> {
        self.command(|events| {
            let track = self.queue.write().select(index)?;
            events.push(self.queue_event());
            self.load_locked(track.clone(), true, events);
            Ok(track)
        })
    }

    // ---- Transport ----

    /// Load `track` and start it. The queue is not touched.
    pub fn load(&self, track: Track) {
        self.command(|events| self.load_locked(track, true, events))
    }

    /// Resume a paused track. With nothing loaded (idle or stopped) the
    /// queue's current entry is loaded instead.
    pub fn play(&self) {
        self.command(|events| {
            let resumed = self.machine.write().play();
            if resumed {
                match self.device.play() {
                    Ok(()) => {
                        events.push(PlaybackEvent::StateChanged {
                            state: PlaybackState::Playing,
                        });
                        self.started_locked(events);
                        self.start_clock_locked();
                    }
                    Err(e) => self.fail_locked(e, events),
                }
                return;
            }

            let state = self.state();
            if !matches!(state, PlaybackState::Idle | PlaybackState::Stopped) {
                return;
            }
            let next = {
                let mut queue = self.queue.write();
                match queue.current_index() {
                    Some(index) => queue.select(index).ok(),
                    None if !queue.is_empty() => queue.select(0).ok(),
                    None => None,
                }
            };
            if let Some(track) = next {
                log::info!("[AudioManager] Resuming queue at '{}'", track.title);
                events.push(self.queue_event());
                self.load_locked(track, true, events);
            }
        })
    }

    pub fn pause(&self) {
        self.command(|events| self.pause_locked(events))
    }

    pub fn stop(&self) {
        self.command(|events| self.stop_locked(events))
    }

    /// Stopped or errored back to idle.
    pub fn reset(&self) {
        self.command(|events| {
            if self.machine.write().reset() {
                events.push(PlaybackEvent::StateChanged {
                    state: PlaybackState::Idle,
                });
            }
        })
    }

    /// Seek within the current track. Returns the clamped position.
    pub fn seek(&self, position: Duration) -> Result<Duration> {
        self.command(|events| {
            let (elapsed, duration) = {
                let mut machine = self.machine.write();
                let elapsed = machine.seek(position)?;
                (elapsed, machine.duration())
            };

            match self.device.seek(elapsed) {
                Ok(()) => events.push(PlaybackEvent::PositionChanged { elapsed, duration }),
                Err(e) => self.fail_locked(e, events),
            }
            Ok(elapsed)
        })
    }

    /// Advance playback time by `delta`. Only effective while playing.
    pub fn tick(&self, delta: Duration) -> TickOutcome {
        self.command(|events| self.tick_locked(delta, events))
    }

    /// Clock entry point. A tick from a cancelled clock is dropped even if
    /// it raced the cancellation.
    pub(super) fn clock_tick(&self, cancelled: &AtomicBool, delta: Duration) {
        self.command(|events| {
            if !cancelled.load(Ordering::SeqCst) {
                self.tick_locked(delta, events);
            }
        })
    }

    /// The device finished the current track on its own.
    pub fn on_track_finished(&self) {
        self.command(|events| {
            if self.machine.read().state().has_track() {
                self.end_of_track_locked(events);
            }
        })
    }

    /// User skip forward. Repeat-one does not pin a skip.
    pub fn next(&self) {
        self.command(|events| {
            let target = {
                let mut queue = self.queue.write();
                let mode = match queue.mode() {
                    PlaybackMode::RepeatOne => PlaybackMode::RepeatAll,
                    mode => mode,
                };
                queue.next_index(mode).and_then(|index| queue.select(index).ok())
            };

            if let Some(track) = target {
                events.push(self.queue_event());
                self.load_locked(track, true, events);
            }
        })
    }

    /// User skip back. Restarts the current track instead once it has
    /// played past the restart threshold.
    pub fn previous(&self) {
        self.command(|events| {
            // Some(duration) when the current track was rewound in place.
            let rewound = {
                let mut machine = self.machine.write();
                if machine.elapsed() > self.previous_restart_threshold {
                    machine.seek(Duration::ZERO).ok().map(|_| machine.duration())
                } else {
                    None
                }
            };

            if let Some(duration) = rewound {
                match self.device.seek(Duration::ZERO) {
                    Ok(()) => events.push(PlaybackEvent::PositionChanged {
                        elapsed: Duration::ZERO,
                        duration,
                    }),
                    Err(e) => self.fail_locked(e, events),
                }
                return;
            }

            let target = {
                let mut queue = self.queue.write();
                let mode = match queue.mode() {
                    PlaybackMode::RepeatOne => PlaybackMode::Normal,
                    mode => mode,
                };
                queue
                    .previous_index(mode)
                    .and_then(|index| queue.select(index).ok())
            };
            if let Some(track) = target {
                events.push(self.queue_event());
                self.load_locked(track, true, events);
            }
        })
    }

    pub fn set_volume(&self, volume: f32) {
        self.command(|events| {
            let volume = if volume.is_nan() {
                0.0
            } else {
                volume.clamp(0.0, 1.0)
            };
            self.volume.store(volume.to_bits(), Ordering::Relaxed);

            if let Err(e) = self.device.set_volume(volume) {
                log::warn!("[AudioManager] Failed to set device volume: {}", e);
            }
            events.push(PlaybackEvent::VolumeChanged { volume });
        })
    }

    // ---- Command plumbing ----

    /// Run `f` under `command_lock`, post the events it collected, then
    /// deliver everything pending once the lock is released.
    fn command<T>(&self, f: impl FnOnce(&mut Events) -> T) -> T {
        let result = {
            let _cmd = self.command_lock.lock();
            let mut events = Events::new();
            let result = f(&mut events);
            for event in events {
                // both ends live in self, so the channel never disconnects
                if self.outbox.send(event).is_err() {
                    log::error!("[AudioManager] Event outbox disconnected");
                }
            }
            result
        };
        self.dispatch();
        result
    }

    /// Drain the outbox into the notifier.
    ///
    /// One thread delivers at a time. A caller that finds delivery already
    /// in progress, including a command issued by an observer, leaves its
    /// events to the running dispatcher, which re-checks the outbox after
    /// releasing `dispatch_lock`.
    fn dispatch(&self) {
        loop {
            let Some(guard) = self.dispatch_lock.try_lock() else {
                return;
            };
            while let Ok(event) = self.pending.try_recv() {
                self.notifier.emit(event);
            }
            drop(guard);

            if self.pending.is_empty() {
                return;
            }
        }
    }

    // ---- Internals (caller holds command_lock) ----

    fn queue_event(&self) -> PlaybackEvent {
        let queue = self.queue.read();
        PlaybackEvent::QueueChanged {
            length: queue.len(),
            current_index: queue.current_index(),
            mode: queue.mode(),
        }
    }

    /// Load `track`. With `autoplay` the device starts it; otherwise it is
    /// left paused at the start.
    fn load_locked(&self, track: Track, autoplay: bool, events: &mut Events) {
        log::info!(
            "[AudioManager] Loading '{}' by '{}' ({})",
            track.title,
            track.artist,
            track.source
        );
        let locator = track.locator().to_string();
        let duration = track.duration;

        self.machine.write().begin_load(track.clone());
        events.push(PlaybackEvent::StateChanged {
            state: PlaybackState::Loading,
        });
        events.push(PlaybackEvent::TrackChanged { track: Some(track) });

        let loaded = self.device.load(&locator).and_then(|_| {
            if autoplay {
                self.device.play()
            } else {
                Ok(())
            }
        });
        if let Err(e) = loaded {
            self.fail_locked(e, events);
            return;
        }

        if autoplay {
            self.machine.write().finish_load();
            events.push(PlaybackEvent::StateChanged {
                state: PlaybackState::Playing,
            });
        } else {
            self.machine.write().finish_load_paused();
            events.push(PlaybackEvent::StateChanged {
                state: PlaybackState::Paused,
            });
        }
        events.push(PlaybackEvent::PositionChanged {
            elapsed: Duration::ZERO,
            duration,
        });
        if autoplay {
            self.started_locked(events);
            self.start_clock_locked();
        }
    }

    /// Announce the loaded track the first time it actually plays.
    fn started_locked(&self, events: &mut Events) {
        let started = {
            let mut machine = self.machine.write();
            machine
                .take_first_start()
                .then(|| machine.track().cloned())
                .flatten()
        };
        if let Some(track) = started {
            events.push(PlaybackEvent::TrackStarted { track });
        }
    }

    fn pause_locked(&self, events: &mut Events) {
        if !self.machine.write().pause() {
            return;
        }
        self.cancel_clock_locked();
        match self.device.pause() {
            Ok(()) => events.push(PlaybackEvent::StateChanged {
                state: PlaybackState::Paused,
            }),
            Err(e) => self.fail_locked(e, events),
        }
    }

    fn stop_locked(&self, events: &mut Events) {
        if !self.machine.write().stop() {
            return;
        }
        self.cancel_clock_locked();
        if let Err(e) = self.device.stop() {
            log::warn!("[AudioManager] Device stop failed: {}", e);
        }
        events.push(PlaybackEvent::StateChanged {
            state: PlaybackState::Stopped,
        });
        events.push(PlaybackEvent::TrackChanged { track: None });
        events.push(PlaybackEvent::PositionChanged {
            elapsed: Duration::ZERO,
            duration: Duration::ZERO,
        });
    }

    fn fail_locked(&self, error: PlayerError, events: &mut Events) {
        log::error!("[AudioManager] Playback failed: {}", error);
        self.cancel_clock_locked();

        let message = match error {
            PlayerError::Device(message) => message,
            other => other.to_string(),
        };
        let state = PlaybackState::Error(message.clone());
        self.machine.write().fail(message);

        events.push(PlaybackEvent::StateChanged { state });
        events.push(PlaybackEvent::TrackChanged { track: None });
    }

    fn tick_locked(&self, delta: Duration, events: &mut Events) -> TickOutcome {
        let (outcome, elapsed, duration) = {
            let mut machine = self.machine.write();
            let outcome = machine.advance(delta);
            (outcome, machine.elapsed(), machine.duration())
        };

        match outcome {
            TickOutcome::Ignored => {}
            TickOutcome::Progressed => {
                events.push(PlaybackEvent::PositionChanged { elapsed, duration });
            }
            TickOutcome::TrackEnded => {
                // Remaining delta past the end is dropped.
                events.push(PlaybackEvent::PositionChanged { elapsed, duration });
                self.end_of_track_locked(events);
            }
        }
        outcome
    }

    fn end_of_track_locked(&self, events: &mut Events) {
        let mode = self.queue.read().mode();
        log::debug!("[AudioManager] Track ended ({:?})", mode);

        if mode == PlaybackMode::RepeatOne {
            let (replay, duration) = {
                let mut machine = self.machine.write();
                machine.restart();
                (machine.track().cloned(), machine.duration())
            };
            match self.device.seek(Duration::ZERO) {
                Ok(()) => {
                    events.push(PlaybackEvent::PositionChanged {
                        elapsed: Duration::ZERO,
                        duration,
                    });
                    if let Some(track) = replay {
                        events.push(PlaybackEvent::TrackStarted { track });
                    }
                }
                Err(e) => self.fail_locked(e, events),
            }
            return;
        }

        let next = {
            let mut queue = self.queue.write();
            if mode == PlaybackMode::Normal && !queue.has_next() {
                None
            } else {
                queue
                    .next_index(mode)
                    .and_then(|index| queue.select(index).ok())
            }
        };

        match next {
            Some(track) => {
                events.push(self.queue_event());
                self.load_locked(track, true, events);
            }
            None => {
                log::info!("[AudioManager] Queue exhausted");
                self.stop_locked(events);
                if mode == PlaybackMode::Normal && self.clear_queue_on_exhaustion {
                    self.queue.write().clear();
                    events.push(self.queue_event());
                }
            }
        }
    }

    fn start_clock_locked(&self) {
        let Some(interval) = self.tick_interval else {
            return;
        };
        let mut clock = self.clock.lock();
        if clock.as_ref().is_some_and(|handle| !handle.is_cancelled()) {
            return;
        }
        *clock = Some(clock::start(self.self_ref.clone(), interval));
    }

    fn cancel_clock_locked(&self) {
        if let Some(handle) = self.clock.lock().take() {
            handle.cancel();
        }
    }
}

impl Drop for AudioManager {
    fn drop(&mut self) {
        if let Some(handle) = self.clock.get_mut().take() {
            handle.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::device::NullDevice;

    fn track(id: &str, secs: u64) -> Track {
        Track::new(id, id.to_uppercase(), "Artist", Duration::from_secs(secs))
    }

    fn manager() -> (Arc<AudioManager>, Arc<NullDevice>) {
        let device = Arc::new(NullDevice::new());
        let manager = AudioManager::with_queue(
            device.clone(),
            Arc::new(PlaybackNotifier::new()),
            &PlayerConfig::default().without_clock(),
            PlayQueue::with_seed(7),
        );
        (manager, device)
    }

    fn ids(manager: &AudioManager) -> Vec<String> {
        manager.queue_tracks().into_iter().map(|t| t.id).collect()
    }

    #[test]
    fn test_set_queue_loads_start_track() {
        let (manager, device) = manager();
        manager.set_queue(vec![track("a", 10), track("b", 10)], 1);

        assert_eq!(manager.state(), PlaybackState::Playing);
        assert_eq!(manager.current_track().unwrap().id, "b");
        assert_eq!(manager.queue_index(), Some(1));
        assert_eq!(device.loaded().as_deref(), Some("b"));
        assert!(device.is_playing());
    }

    #[test]
    fn test_tick_advances_to_next_track() {
        let (manager, _) = manager();
        manager.set_queue(vec![track("a", 10), track("b", 20)], 0);
        manager.seek(Duration::from_secs_f64(9.95)).unwrap();

        assert_eq!(manager.tick(Duration::from_millis(100)), TickOutcome::TrackEnded);
        assert_eq!(manager.current_track().unwrap().id, "b");
        assert_eq!(manager.elapsed(), Duration::ZERO);
        assert_eq!(manager.queue_index(), Some(1));
    }

    #[test]
    fn test_exhausted_normal_queue_stops_and_clears() {
        let (manager, device) = manager();
        manager.set_queue(vec![track("a", 1)], 0);
        manager.tick(Duration::from_secs(2));

        assert_eq!(manager.state(), PlaybackState::Stopped);
        assert!(manager.current_track().is_none());
        assert!(manager.queue_tracks().is_empty());
        assert!(!device.is_playing());
    }

    #[test]
    fn test_repeat_one_restarts_same_track() {
        let (manager, _) = manager();
        manager.set_queue(vec![track("a", 5), track("b", 5)], 0);
        manager.set_mode(PlaybackMode::RepeatOne);

        manager.tick(Duration::from_secs(6));
        assert_eq!(manager.state(), PlaybackState::Playing);
        assert_eq!(manager.current_track().unwrap().id, "a");
        assert_eq!(manager.elapsed(), Duration::ZERO);

        // a user skip is not pinned
        manager.next();
        assert_eq!(manager.current_track().unwrap().id, "b");
    }

    #[test]
    fn test_repeat_all_wraps() {
        let (manager, _) = manager();
        manager.set_queue(vec![track("a", 5), track("b", 5)], 1);
        manager.set_mode(PlaybackMode::RepeatAll);

        manager.on_track_finished();
        assert_eq!(manager.current_track().unwrap().id, "a");
        assert_eq!(manager.queue_index(), Some(0));
    }

    #[test]
    fn test_remove_current_while_paused_stays_paused() {
        let (manager, _) = manager();
        manager.set_queue(vec![track("a", 5), track("b", 5), track("c", 5)], 1);
        manager.pause();

        manager.remove_at(1).unwrap();
        assert_eq!(ids(&manager), vec!["a", "c"]);
        assert_eq!(manager.current_track().unwrap().id, "c");
        assert_eq!(manager.state(), PlaybackState::Paused);
    }

    #[test]
    fn test_play_resumes_from_queue_after_stop() {
        let (manager, _) = manager();
        manager.set_queue(vec![track("a", 5), track("b", 5)], 1);
        manager.stop();
        assert_eq!(manager.state(), PlaybackState::Stopped);

        manager.play();
        assert_eq!(manager.state(), PlaybackState::Playing);
        assert_eq!(manager.current_track().unwrap().id, "b");
    }

    #[test]
    fn test_previous_restarts_after_threshold() {
        let (manager, _) = manager();
        manager.set_queue(vec![track("a", 60), track("b", 60)], 1);

        manager.tick(Duration::from_secs(10));
        manager.previous();
        assert_eq!(manager.current_track().unwrap().id, "b");
        assert_eq!(manager.elapsed(), Duration::ZERO);

        manager.previous();
        assert_eq!(manager.current_track().unwrap().id, "a");
    }

    #[test]
    fn test_previous_rewinds_paused_track_in_place() {
        let (manager, device) = manager();
        manager.set_queue(vec![track("a", 60), track("b", 60)], 1);
        manager.tick(Duration::from_secs(10));
        manager.pause();

        manager.previous();
        assert_eq!(manager.current_track().unwrap().id, "b");
        assert_eq!(manager.state(), PlaybackState::Paused);
        assert_eq!(manager.elapsed(), Duration::ZERO);
        assert_eq!(device.position(), Duration::ZERO);
    }

    #[test]
    fn test_repeat_one_replay_announces_start() {
        let (manager, _) = manager();
        let (_, rx) = manager.notifier().subscribe_channel();
        manager.set_queue(vec![track("a", 5), track("b", 5)], 0);
        manager.set_mode(PlaybackMode::RepeatOne);

        manager.tick(Duration::from_secs(6));
        manager.tick(Duration::from_secs(6));

        let starts: Vec<String> = rx
            .try_iter()
            .filter_map(|event| match event {
                PlaybackEvent::TrackStarted { track } => Some(track.id),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec!["a", "a", "a"]);
    }

    #[test]
    fn test_paused_replacement_starts_only_when_played() {
        let (manager, device) = manager();
        manager.set_queue(vec![track("a", 5), track("b", 5)], 0);
        manager.pause();
        let (_, rx) = manager.notifier().subscribe_channel();

        manager.remove_at(0).unwrap();
        assert_eq!(device.loaded().as_deref(), Some("b"));
        assert!(!device.is_playing());
        assert!(!manager.is_clock_running());
        assert!(!rx
            .try_iter()
            .any(|event| matches!(event, PlaybackEvent::TrackStarted { .. })));

        manager.play();
        manager.pause();
        manager.play();
        let starts = rx
            .try_iter()
            .filter(|event| matches!(event, PlaybackEvent::TrackStarted { .. }))
            .count();
        assert_eq!(starts, 1);
        assert!(device.is_playing());
    }

    #[test]
    fn test_observer_command_is_delivered_after_current_event() {
        let (manager, _) = manager();
        let handle = Arc::downgrade(&manager);
        manager
            .notifier()
            .subscribe(Arc::new(move |event: &PlaybackEvent| {
                if let (PlaybackEvent::StateChanged { state: PlaybackState::Stopped }, Some(m)) =
                    (event, handle.upgrade())
                {
                    m.reset();
                }
            }));
        let (_, rx) = manager.notifier().subscribe_channel();
        manager.load(track("a", 30));
        rx.try_iter().for_each(drop);

        manager.stop();

        assert_eq!(manager.state(), PlaybackState::Idle);
        let states: Vec<PlaybackState> = rx
            .try_iter()
            .filter_map(|event| match event {
                PlaybackEvent::StateChanged { state } => Some(state),
                _ => None,
            })
            .collect();
        assert_eq!(states, vec![PlaybackState::Stopped, PlaybackState::Idle]);
    }

    #[test]
    fn test_volume_is_clamped_and_applied() {
        let (manager, device) = manager();
        manager.set_volume(1.7);
        assert_eq!(manager.volume(), 1.0);
        manager.set_volume(-0.2);
        assert_eq!(manager.volume(), 0.0);
        assert_eq!(device.volume(), 0.0);
    }

    #[test]
    fn test_clock_starts_and_stops_with_playback() {
        let device = Arc::new(NullDevice::new());
        let config = PlayerConfig {
            tick_interval_ms: 10,
            ..PlayerConfig::default()
        };
        let manager =
            AudioManager::new(device, Arc::new(PlaybackNotifier::new()), &config);

        manager.load(track("a", 60));
        assert!(manager.is_clock_running());
        std::thread::sleep(Duration::from_millis(80));
        assert!(manager.elapsed() > Duration::ZERO);

        manager.pause();
        assert!(!manager.is_clock_running());
        let paused_at = manager.elapsed();
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(manager.elapsed(), paused_at);
    }
}
