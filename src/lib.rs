pub mod audio;
pub mod config;
pub mod errors;
pub mod history;
pub mod models;
pub mod playback_notifier;
pub mod player;
pub mod providers;
pub mod queue;
pub mod recommendations;

pub use audio::{AudioDevice, AudioManager, NullDevice, PlaybackSnapshot, PlaybackState};
pub use config::PlayerConfig;
pub use errors::{PlayerError, Result};
pub use models::{Mood, Track, TrackSource};
pub use playback_notifier::{PlaybackEvent, PlaybackNotifier, PlaybackObserver, SubscriptionId};
pub use player::Player;
pub use providers::{Aggregated, LocalProvider, ProviderManager, SourceProvider};
pub use queue::{PlayQueue, PlaybackMode, QueueChange};
pub use recommendations::{EnergyDirection, Suggestion, SuggestionContext, SuggestionEngine};
