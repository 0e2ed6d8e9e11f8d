use crate::models::{Track, TrackSource};
use crate::providers::traits::SourceProvider;
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory catalog. Backs the local library and stands in for remote
/// catalogs in demos and tests.
pub struct LocalProvider {
    id: String,
    name: String,
    source: TrackSource,
    tracks: RwLock<Vec<Track>>,
    available: AtomicBool,
}

impl LocalProvider {
    pub fn new(id: impl Into<String>, name: impl Into<String>, source: TrackSource) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source,
            tracks: RwLock::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Tracks are re-tagged with this provider's source.
    pub fn with_tracks(self, tracks: Vec<Track>) -> Self {
        for track in tracks {
            self.add_track(track);
        }
        self
    }

    pub fn add_track(&self, track: Track) {
        self.tracks.write().push(track.with_source(self.source));
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.tracks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.read().is_empty()
    }

    /// Every whitespace separated term must appear in the title, artist,
    /// album or genre (case-insensitive).
    fn matches(track: &Track, terms: &[String]) -> bool {
        let haystack = format!(
            "{} {} {} {}",
            track.title,
            track.artist,
            track.album.as_deref().unwrap_or(""),
            track.genre.as_deref().unwrap_or("")
        )
        .to_lowercase();
        terms.iter().all(|term| haystack.contains(term.as_str()))
    }
}

#[async_trait]
impl SourceProvider for LocalProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> TrackSource {
        self.source
    }

    async fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    async fn fetch_songs(&self) -> Result<Vec<Track>> {
        Ok(self.tracks.read().clone())
    }

    async fn search_songs(&self, query: &str) -> Result<Vec<Track>> {
        let terms: Vec<String> = query.split_whitespace().map(|t| t.to_lowercase()).collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let tracks = self.tracks.read();
        Ok(tracks
            .iter()
            .filter(|track| Self::matches(track, &terms))
            .cloned()
            .collect())
    }
}
