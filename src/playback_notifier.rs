//! Centralized Playback Notification Service
//!
//! Every observable change in the playback core flows through
//! [`PlaybackNotifier`]. Consumers either register a [`PlaybackObserver`]
//! (called synchronously, in emission order) or take a channel receiver
//! and drain it on their own thread.
//!
//! Events are emitted only after the mutation that caused them is complete,
//! so an observer reading a snapshot from inside a callback sees the new
//! state. Observers may issue playback commands from inside `on_event`; the
//! events those commands produce are delivered once the current event has
//! reached every subscriber.

use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::audio::types::PlaybackState;
use crate::models::Track;
use crate::queue::PlaybackMode;
use crate::recommendations::Suggestion;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    TrackChanged {
        track: Option<Track>,
    },
    /// A track began playing from its start, including repeat-one replays.
    TrackStarted {
        track: Track,
    },
    StateChanged {
        state: PlaybackState,
    },
    PositionChanged {
        elapsed: Duration,
        duration: Duration,
    },
    QueueChanged {
        length: usize,
        current_index: Option<usize>,
        mode: PlaybackMode,
    },
    SuggestionsUpdated {
        suggestions: Vec<Suggestion>,
    },
    VolumeChanged {
        volume: f32,
    },
}

pub trait PlaybackObserver: Send + Sync {
    fn on_event(&self, event: &PlaybackEvent);
}

impl<F> PlaybackObserver for F
where
    F: Fn(&PlaybackEvent) + Send + Sync,
{
    fn on_event(&self, event: &PlaybackEvent) {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

enum Subscriber {
    Observer(Arc<dyn PlaybackObserver>),
    Channel(Sender<PlaybackEvent>),
}

pub struct PlaybackNotifier {
    subscribers: RwLock<Vec<(SubscriptionId, Subscriber)>>,
    enabled: AtomicBool,
}

impl Default for PlaybackNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackNotifier {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            enabled: AtomicBool::new(true),
        }
    }

    pub fn subscribe(&self, observer: Arc<dyn PlaybackObserver>) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.write().push((id, Subscriber::Observer(observer)));
        id
    }

    /// Unbounded channel subscription. Dropping the receiver unsubscribes
    /// on the next emitted event.
    pub fn subscribe_channel(&self) -> (SubscriptionId, Receiver<PlaybackEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.write().push((id, Subscriber::Channel(tx)));
        (id, rx)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sub_id, _)| *sub_id != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn emit(&self, event: PlaybackEvent) {
        if !self.enabled.load(Ordering::Relaxed) {
            return;
        }

        match &event {
            PlaybackEvent::PositionChanged { .. } => {
                log::trace!("[PlaybackNotifier] {:?}", event)
            }
            PlaybackEvent::TrackChanged { track } => log::info!(
                "[PlaybackNotifier] Track changed: {}",
                track
                    .as_ref()
                    .map(|t| format!("'{}' by '{}'", t.title, t.artist))
                    .unwrap_or_else(|| "none".to_string())
            ),
            PlaybackEvent::StateChanged { state } => {
                log::info!("[PlaybackNotifier] State: {:?}", state)
            }
            _ => log::debug!("[PlaybackNotifier] {:?}", event),
        }

        // Clone the list so observers run without the subscriber lock held
        let observers: Vec<Arc<dyn PlaybackObserver>> = {
            let subscribers = self.subscribers.read();
            subscribers
                .iter()
                .filter_map(|(_, sub)| match sub {
                    Subscriber::Observer(observer) => Some(observer.clone()),
                    Subscriber::Channel(_) => None,
                })
                .collect()
        };
        for observer in observers {
            observer.on_event(&event);
        }

        let mut disconnected = Vec::new();
        {
            let subscribers = self.subscribers.read();
            for (id, sub) in subscribers.iter() {
                if let Subscriber::Channel(tx) = sub {
                    if tx.send(event.clone()).is_err() {
                        disconnected.push(*id);
                    }
                }
            }
        }
        for id in disconnected {
            log::debug!("[PlaybackNotifier] Dropping closed channel subscriber");
            self.unsubscribe(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_observer_and_channel_receive_in_order() {
        let notifier = PlaybackNotifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        notifier.subscribe(Arc::new(move |event: &PlaybackEvent| {
            sink.lock().push(format!("{:?}", event));
        }));
        let (_, rx) = notifier.subscribe_channel();

        notifier.emit(PlaybackEvent::StateChanged { state: PlaybackState::Playing });
        notifier.emit(PlaybackEvent::VolumeChanged { volume: 0.5 });

        assert_eq!(seen.lock().len(), 2);
        assert!(matches!(rx.try_recv().unwrap(), PlaybackEvent::StateChanged { .. }));
        assert!(matches!(rx.try_recv().unwrap(), PlaybackEvent::VolumeChanged { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_channel_is_pruned() {
        let notifier = PlaybackNotifier::new();
        let (_, rx) = notifier.subscribe_channel();
        assert_eq!(notifier.subscriber_count(), 1);
        drop(rx);

        notifier.emit(PlaybackEvent::VolumeChanged { volume: 1.0 });
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_and_disable() {
        let notifier = PlaybackNotifier::new();
        let (id, rx) = notifier.subscribe_channel();

        notifier.set_enabled(false);
        notifier.emit(PlaybackEvent::VolumeChanged { volume: 1.0 });
        assert!(rx.try_recv().is_err());

        notifier.set_enabled(true);
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.emit(PlaybackEvent::VolumeChanged { volume: 1.0 });
        assert!(rx.try_recv().is_err());
    }
}
