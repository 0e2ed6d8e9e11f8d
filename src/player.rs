use parking_lot::RwLock;
use std::sync::Arc;

use crate::audio::{AudioDevice, AudioManager};
use crate::config::PlayerConfig;
use crate::models::Track;
use crate::playback_notifier::{PlaybackEvent, PlaybackNotifier, SubscriptionId};
use crate::providers::{Aggregated, ProviderManager};
use crate::recommendations::{Suggestion, SuggestionContext, SuggestionEngine};

/// Wires the aggregator, the playback controller and the suggestion engine
/// around one notifier.
///
/// Every track that starts playing from its beginning, repeat-one replays
/// included, is recorded in the suggestion history.
pub struct Player {
    config: PlayerConfig,
    providers: ProviderManager,
    audio: Arc<AudioManager>,
    suggestions: Arc<SuggestionEngine>,
    notifier: Arc<PlaybackNotifier>,
    library: RwLock<Vec<Track>>,
    history_subscription: SubscriptionId,
}

impl Player {
    pub fn new(config: PlayerConfig, device: Arc<dyn AudioDevice>) -> Self {
        let config = config.sanitized();
        let notifier = Arc::new(PlaybackNotifier::new());
        let audio = AudioManager::new(device, notifier.clone(), &config);
        let suggestions = Arc::new(SuggestionEngine::new(config.history_capacity));

        let engine = suggestions.clone();
        let history_subscription = notifier.subscribe(Arc::new(move |event: &PlaybackEvent| {
            if let PlaybackEvent::TrackStarted { track } = event {
                engine.add_to_history(track);
            }
        }));

        log::info!(
            "[Player] Ready (history {}, provider timeout {:?})",
            config.history_capacity,
            config.provider_timeout()
        );

        Self {
            providers: ProviderManager::with_timeout(config.provider_timeout()),
            config,
            audio,
            suggestions,
            notifier,
            library: RwLock::new(Vec::new()),
            history_subscription,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn providers(&self) -> &ProviderManager {
        &self.providers
    }

    pub fn audio(&self) -> &Arc<AudioManager> {
        &self.audio
    }

    pub fn suggestions(&self) -> &SuggestionEngine {
        &self.suggestions
    }

    pub fn notifier(&self) -> &Arc<PlaybackNotifier> {
        &self.notifier
    }

    /// Re-fetch every provider and keep the result as the candidate pool.
    pub async fn refresh_library(&self) -> Aggregated {
        let aggregated = self.providers.fetch_all().await;
        log::info!(
            "[Player] Library refreshed: {} tracks, {} provider failures",
            aggregated.tracks.len(),
            aggregated.failures.len()
        );
        *self.library.write() = aggregated.tracks.clone();
        aggregated
    }

    pub async fn search(&self, query: &str) -> Aggregated {
        self.providers.search_all(query).await
    }

    pub fn library(&self) -> Vec<Track> {
        self.library.read().clone()
    }

    /// Queue the whole library and start at `start_index`.
    pub fn play_library(&self, start_index: usize) {
        let tracks = self.library();
        self.audio.set_queue(tracks, start_index);
    }

    /// Rank the library against the current track and publish the result.
    pub fn refresh_suggestions(&self, context: SuggestionContext, limit: usize) -> Vec<Suggestion> {
        let current = self.audio.current_track();
        let suggestions = {
            let pool = self.library.read();
            self.suggestions
                .top_suggestions(&pool, current.as_ref(), context, limit)
        };

        self.notifier.emit(PlaybackEvent::SuggestionsUpdated {
            suggestions: suggestions.clone(),
        });
        suggestions
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.notifier.unsubscribe(self.history_subscription);
    }
}
