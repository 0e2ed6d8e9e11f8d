use crate::models::{Track, TrackSource};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Unique identifier (e.g., "local", "tidal", "subsonic")
    fn id(&self) -> &str;

    /// User-friendly name
    fn name(&self) -> &str;

    /// Source tag stamped on the tracks this provider returns
    fn source(&self) -> TrackSource;

    /// Whether the provider can serve requests right now.
    /// Unavailable providers are skipped without calling fetch or search.
    async fn is_available(&self) -> bool {
        true
    }

    /// Full catalog (or the part of it the user has in their library)
    async fn fetch_songs(&self) -> Result<Vec<Track>>;

    /// Free text search
    async fn search_songs(&self, query: &str) -> Result<Vec<Track>>;
}
