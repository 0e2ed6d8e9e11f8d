//! Suggestion engine implementation.
//!
//! Ranks a candidate pool against the current track, the listening history
//! and a usage context. The history is owned here and only grows through
//! [`SuggestionEngine::add_to_history`].

use parking_lot::RwLock;
use rand::seq::IndexedRandom;

use crate::history::{HistoryEntry, ListeningHistory};
use crate::models::Track;
use crate::recommendations::scoring;
use crate::recommendations::types::{EnergyDirection, ScoreBreakdown, Suggestion, SuggestionContext};

/// Energy assumed for a current track that carries none.
const NEUTRAL_ENERGY: f32 = 0.5;

/// Slack for float comparisons at the edge of an energy window.
const WINDOW_EPSILON: f32 = 1e-4;

pub struct SuggestionEngine {
    history: RwLock<ListeningHistory>,
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new(crate::history::DEFAULT_HISTORY_CAPACITY)
    }
}

impl SuggestionEngine {
    pub fn new(history_capacity: usize) -> Self {
        Self {
            history: RwLock::new(ListeningHistory::new(history_capacity)),
        }
    }

    pub fn add_to_history(&self, track: &Track) {
        log::debug!("[SuggestionEngine] Recording play of '{}'", track.title);
        self.history.write().record_play(track);
    }

    pub fn history_snapshot(&self) -> Vec<HistoryEntry> {
        self.history.read().entries().cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }

    pub fn clear_history(&self) {
        self.history.write().clear();
        log::info!("[SuggestionEngine] Listening history cleared");
    }

    /// Weighted score of `candidate` against the engine's own history.
    pub fn score(
        &self,
        candidate: &Track,
        current: Option<&Track>,
        context: SuggestionContext,
    ) -> f32 {
        let history = self.history.read();
        scoring::score(candidate, current, &history, context)
    }

    pub fn explain(
        &self,
        candidate: &Track,
        current: Option<&Track>,
        context: SuggestionContext,
    ) -> ScoreBreakdown {
        let history = self.history.read();
        scoring::breakdown(candidate, current, &history, context)
    }

    /// Best `limit` candidates from `pool`, highest score first.
    ///
    /// The current track is never suggested. Equal scores keep pool order.
    pub fn top_suggestions(
        &self,
        pool: &[Track],
        current: Option<&Track>,
        context: SuggestionContext,
        limit: usize,
    ) -> Vec<Suggestion> {
        let history = self.history.read();
        let mut ranked: Vec<Suggestion> = pool
            .iter()
            .filter(|candidate| current != Some(*candidate))
            .map(|candidate| Suggestion {
                track: candidate.clone(),
                score: scoring::score(candidate, current, &history, context),
            })
            .collect();
        drop(history);

        // Vec::sort_by is stable
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);

        log::debug!(
            "[SuggestionEngine] {} suggestions for context {:?} from a pool of {}",
            ranked.len(),
            context,
            pool.len()
        );
        ranked
    }

    /// Tracks most similar to `track`, by similarity alone.
    pub fn similar_to(&self, pool: &[Track], track: &Track, limit: usize) -> Vec<Suggestion> {
        let mut ranked: Vec<Suggestion> = pool
            .iter()
            .filter(|candidate| *candidate != track)
            .map(|candidate| Suggestion {
                track: candidate.clone(),
                score: scoring::similarity(track, candidate),
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);
        ranked
    }

    /// Random sample of tracks whose energy sits in a window around the
    /// current track's energy. Unranked; two calls may disagree.
    pub fn energy_transition(
        &self,
        pool: &[Track],
        current: &Track,
        direction: EnergyDirection,
        limit: usize,
    ) -> Vec<Track> {
        let energy = current.energy.unwrap_or(NEUTRAL_ENERGY);
        let (low, high) = match direction {
            EnergyDirection::Higher => (energy + 0.1, 1.0),
            EnergyDirection::Lower => (0.0, energy - 0.1),
            EnergyDirection::Similar => (energy - 0.2, energy + 0.2),
        };

        let candidates: Vec<&Track> = pool
            .iter()
            .filter(|candidate| *candidate != current)
            .filter(|candidate| {
                candidate.energy.is_some_and(|e| {
                    e >= low - WINDOW_EPSILON && e <= high + WINDOW_EPSILON
                })
            })
            .collect();

        let mut rng = rand::rng();
        candidates
            .choose_multiple(&mut rng, limit)
            .map(|track| (*track).clone())
            .collect()
    }
}
