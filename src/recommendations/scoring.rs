//! Sub-scores combined by the suggestion engine.
//!
//! Every function here is pure and returns a value in `0.0..=1.0`.

use crate::history::{HistoryEntry, ListeningHistory};
use crate::models::{Mood, Track};
use crate::recommendations::types::{ScoreBreakdown, SuggestionContext};

/// History entries considered for artist/mood affinity.
const AFFINITY_WINDOW: usize = 20;

/// Candidates played this recently get penalized.
const RECENCY_WINDOW: usize = 5;
const RECENCY_PENALTY: f32 = 0.5;

/// History entries considered for the variety bonus.
const VARIETY_WINDOW: usize = 10;

fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn same_optional_text(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if same_text(a, b))
}

pub fn similarity(current: &Track, candidate: &Track) -> f32 {
    let mut score = 0.0;

    if same_text(&current.artist, &candidate.artist) {
        score += 0.4;
    }
    if same_optional_text(current.album.as_deref(), candidate.album.as_deref()) {
        score += 0.3;
    }
    if current.source == candidate.source {
        score += 0.1;
    }
    if current.mood.is_some() && current.mood == candidate.mood {
        score += 0.2;
    }
    if same_optional_text(current.genre.as_deref(), candidate.genre.as_deref()) {
        score += 0.3;
    }
    if let (Some(a), Some(b)) = (current.energy, candidate.energy) {
        score += (1.0 - (a - b).abs()) * 0.2;
    }

    score.clamp(0.0, 1.0)
}

pub fn history_affinity(candidate: &Track, history: &ListeningHistory) -> f32 {
    let mut artist_hits = 0usize;
    let mut mood_hits = 0usize;
    for entry in history.recent(AFFINITY_WINDOW) {
        if same_text(&entry.artist, &candidate.artist) {
            artist_hits += 1;
        }
        if candidate.mood.is_some() && entry.mood == candidate.mood {
            mood_hits += 1;
        }
    }

    let mut score =
        (artist_hits as f32 * 0.5 + mood_hits as f32 * 0.3) / AFFINITY_WINDOW as f32;

    let recently_played = history
        .recent(RECENCY_WINDOW)
        .any(|entry| entry.track_id == candidate.id);
    if recently_played {
        score -= RECENCY_PENALTY;
    }

    score.clamp(0.0, 1.0)
}

pub fn context_fit(candidate: &Track, context: SuggestionContext) -> f32 {
    let energy = candidate.energy;
    let mood = candidate.mood;
    let mood_in = |wanted: &[Mood]| mood.is_some_and(|m| wanted.contains(&m));

    let (energy_hit, mood_hit) = match context {
        SuggestionContext::General => return 0.0,
        SuggestionContext::Workout => (
            energy.is_some_and(|e| e > 0.7),
            mood_in(&[Mood::Energetic, Mood::Upbeat]),
        ),
        SuggestionContext::Focus => (
            energy.is_some_and(|e| e < 0.4),
            mood_in(&[Mood::Focus, Mood::Chill]),
        ),
        SuggestionContext::Party => (
            energy.is_some_and(|e| e > 0.6),
            mood_in(&[Mood::Party, Mood::Upbeat]),
        ),
        SuggestionContext::Relaxing => (
            energy.is_some_and(|e| e < 0.4),
            mood_in(&[Mood::Relaxing, Mood::Chill]),
        ),
    };

    let mut score = 0.0;
    if energy_hit {
        score += 0.5;
    }
    if mood_hit {
        score += 0.5;
    }
    score
}

pub fn variety_bonus(candidate: &Track, history: &ListeningHistory) -> f32 {
    let window: Vec<&HistoryEntry> = history.recent(VARIETY_WINDOW).collect();
    let mut score = 0.0;

    if !window.iter().any(|e| same_text(&e.artist, &candidate.artist)) {
        score += 0.3;
    }
    if let Some(genre) = candidate.genre.as_deref() {
        let heard = window
            .iter()
            .any(|e| same_optional_text(e.genre.as_deref(), Some(genre)));
        if !heard {
            score += 0.2;
        }
    }

    score
}

/// All four sub-scores for `candidate`. With no current track the
/// similarity term is zero.
pub fn breakdown(
    candidate: &Track,
    current: Option<&Track>,
    history: &ListeningHistory,
    context: SuggestionContext,
) -> ScoreBreakdown {
    ScoreBreakdown {
        similarity: current.map_or(0.0, |current| similarity(current, candidate)),
        history_affinity: history_affinity(candidate, history),
        context_fit: context_fit(candidate, context),
        variety_bonus: variety_bonus(candidate, history),
    }
}

pub fn score(
    candidate: &Track,
    current: Option<&Track>,
    history: &ListeningHistory,
    context: SuggestionContext,
) -> f32 {
    breakdown(candidate, current, history, context).total()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackSource;
    use std::time::Duration;

    const EPS: f32 = 1e-5;

    fn track(id: &str, artist: &str) -> Track {
        Track::new(id, id, artist, Duration::from_secs(200))
    }

    #[test]
    fn test_similarity_artist_and_mood() {
        let current = track("cur", "Daft Punk").with_mood(Mood::Upbeat);
        let candidate = track("cand", "daft punk")
            .with_mood(Mood::Upbeat)
            .with_source(TrackSource::Tidal);

        let sim = similarity(&current, &candidate);
        assert!((sim - 0.6).abs() < EPS, "similarity was {}", sim);
        assert!((sim * ScoreBreakdown::SIMILARITY_WEIGHT - 0.18).abs() < EPS);
    }

    #[test]
    fn test_similarity_is_capped() {
        let base = track("a", "Artist")
            .with_album("Album")
            .with_mood(Mood::Chill)
            .with_genre("House")
            .with_energy(0.5);
        let twin = Track { id: "b".to_string(), ..base.clone() };
        assert_eq!(similarity(&base, &twin), 1.0);
    }

    #[test]
    fn test_similarity_energy_closeness() {
        let a = track("a", "X").with_energy(0.2).with_source(TrackSource::Tidal);
        let b = track("b", "Y").with_energy(0.7);
        assert!((similarity(&a, &b) - 0.1).abs() < EPS);
    }

    #[test]
    fn test_similarity_ignores_missing_energy() {
        let known = track("a", "X").with_energy(0.5).with_source(TrackSource::Tidal);
        let unknown = track("b", "Y");
        // no neutral 0.5 stand-in: the energy term is skipped entirely
        assert_eq!(similarity(&known, &unknown), 0.0);
        assert_eq!(similarity(&unknown, &known), 0.0);
    }

    #[test]
    fn test_history_affinity_counts_artist_and_mood() {
        let mut history = ListeningHistory::new(50);
        for i in 0..4 {
            history.record_play(&track(&format!("h{}", i), "Artist").with_mood(Mood::Chill));
        }
        let candidate = track("new", "Artist").with_mood(Mood::Chill);

        // (4 * 0.5 + 4 * 0.3) / 20
        assert!((history_affinity(&candidate, &history) - 0.16).abs() < EPS);
    }

    #[test]
    fn test_history_affinity_recency_penalty_floors_at_zero() {
        let mut history = ListeningHistory::new(50);
        let candidate = track("again", "Artist");
        history.record_play(&candidate);
        assert_eq!(history_affinity(&candidate, &history), 0.0);

        // pushed out of the recency window the penalty no longer applies
        for i in 0..5 {
            history.record_play(&track(&format!("other{}", i), "Someone"));
        }
        assert!((history_affinity(&candidate, &history) - 0.025).abs() < EPS);
    }

    #[test]
    fn test_context_fit_table() {
        let pumped = track("a", "X").with_energy(0.9).with_mood(Mood::Energetic);
        assert_eq!(context_fit(&pumped, SuggestionContext::Workout), 1.0);
        assert_eq!(context_fit(&pumped, SuggestionContext::Party), 0.5);
        assert_eq!(context_fit(&pumped, SuggestionContext::Focus), 0.0);
        assert_eq!(context_fit(&pumped, SuggestionContext::General), 0.0);

        let calm = track("b", "X").with_energy(0.2).with_mood(Mood::Chill);
        assert_eq!(context_fit(&calm, SuggestionContext::Focus), 1.0);
        assert_eq!(context_fit(&calm, SuggestionContext::Relaxing), 1.0);
        assert_eq!(context_fit(&calm, SuggestionContext::Workout), 0.0);

        let bare = track("c", "X");
        assert_eq!(context_fit(&bare, SuggestionContext::Party), 0.0);
    }

    #[test]
    fn test_variety_bonus() {
        let mut history = ListeningHistory::new(50);
        let candidate = track("c", "Fresh").with_genre("Jazz");
        assert!((variety_bonus(&candidate, &history) - 0.5).abs() < EPS);

        history.record_play(&track("h", "Fresh"));
        assert!((variety_bonus(&candidate, &history) - 0.2).abs() < EPS);

        history.record_play(&track("h2", "Other").with_genre("jazz"));
        assert_eq!(variety_bonus(&candidate, &history), 0.0);

        let no_genre = track("n", "Unknown");
        assert!((variety_bonus(&no_genre, &history) - 0.3).abs() < EPS);
    }

    #[test]
    fn test_weighted_total() {
        let history = ListeningHistory::new(50);
        let current = track("cur", "Artist").with_mood(Mood::Upbeat);
        let candidate = track("cand", "Artist")
            .with_mood(Mood::Upbeat)
            .with_source(TrackSource::Subsonic);

        let parts = breakdown(&candidate, Some(&current), &history, SuggestionContext::General);
        assert!((parts.similarity - 0.6).abs() < EPS);
        assert_eq!(parts.history_affinity, 0.0);
        assert_eq!(parts.context_fit, 0.0);
        assert!((parts.variety_bonus - 0.3).abs() < EPS);

        let total = score(&candidate, Some(&current), &history, SuggestionContext::General);
        assert!((total - (0.18 + 0.06)).abs() < EPS);
    }
}
