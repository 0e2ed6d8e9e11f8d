use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use super::manager::AudioManager;

/// Handle to a running progress clock. The thread stops at its next wake
/// after `cancel`, or once the manager it drives is dropped.
#[derive(Debug)]
pub struct ClockHandle {
    cancelled: Arc<AtomicBool>,
}

impl ClockHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawns a thread feeding wall-clock time into `AudioManager::tick`.
pub fn start(manager: Weak<AudioManager>, interval: Duration) -> ClockHandle {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();

    thread::spawn(move || {
        log::debug!("[ProgressClock] Started ({:?} interval)", interval);
        let mut last = Instant::now();

        loop {
            thread::sleep(interval);
            if flag.load(Ordering::SeqCst) {
                break;
            }
            let Some(manager) = manager.upgrade() else {
                break;
            };

            let now = Instant::now();
            manager.clock_tick(&flag, now - last);
            last = now;
        }

        log::debug!("[ProgressClock] Stopped");
    });

    ClockHandle { cancelled }
}
