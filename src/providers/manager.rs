use crate::models::Track;
use crate::providers::traits::SourceProvider;
use crate::providers::types::{Aggregated, FailureKind, ProviderFailure};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
enum Request<'a> {
    Fetch,
    Search(&'a str),
}

enum Contribution {
    Tracks(Vec<Track>),
    Unavailable,
    Failed(FailureKind),
}

/// Registry of source providers that fans every request out to all of
/// them at once and merges whatever comes back.
///
/// A provider that is unavailable, errors, or misses its deadline
/// contributes nothing; the call itself never fails.
pub struct ProviderManager {
    providers: Arc<RwLock<Vec<Arc<dyn SourceProvider>>>>,
    timeout: Duration,
}

impl Default for ProviderManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderManager {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_PROVIDER_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            providers: Arc::new(RwLock::new(Vec::new())),
            timeout,
        }
    }

    /// Registers a provider. Registering an id again replaces the old
    /// provider in place, keeping its position.
    pub async fn register_provider(&self, provider: Arc<dyn SourceProvider>) {
        let mut providers = self.providers.write().await;
        log::info!(
            "[ProviderManager] Registering provider: {} ({})",
            provider.name(),
            provider.id()
        );
        match providers.iter().position(|p| p.id() == provider.id()) {
            Some(idx) => providers[idx] = provider,
            None => providers.push(provider),
        }
    }

    pub async fn unregister_provider(&self, id: &str) -> bool {
        let mut providers = self.providers.write().await;
        let before = providers.len();
        providers.retain(|p| p.id() != id);
        let removed = providers.len() != before;
        if removed {
            log::info!("[ProviderManager] Unregistered provider: {}", id);
        }
        removed
    }

    pub async fn get_provider(&self, id: &str) -> Option<Arc<dyn SourceProvider>> {
        let providers = self.providers.read().await;
        providers.iter().find(|p| p.id() == id).cloned()
    }

    /// Provider ids in registration order.
    pub async fn list_providers(&self) -> Vec<String> {
        let providers = self.providers.read().await;
        providers.iter().map(|p| p.id().to_string()).collect()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn fetch_all(&self) -> Aggregated {
        self.fan_out(Request::Fetch).await
    }

    /// Searches every provider. A blank query returns nothing without
    /// touching any provider.
    pub async fn search_all(&self, query: &str) -> Aggregated {
        let query = query.trim();
        if query.is_empty() {
            return Aggregated::default();
        }
        self.fan_out(Request::Search(query)).await
    }

    async fn fan_out(&self, request: Request<'_>) -> Aggregated {
        // Snapshot so no lock is held while providers run
        let providers = self.providers.read().await.clone();
        let timeout = self.timeout;

        let calls = providers.iter().map(|provider| async move {
            let outcome =
                match tokio::time::timeout(timeout, Self::call(provider.as_ref(), request)).await {
                    Ok(Ok(Some(tracks))) => Contribution::Tracks(tracks),
                    Ok(Ok(None)) => Contribution::Unavailable,
                    Ok(Err(e)) => Contribution::Failed(FailureKind::Error(format!("{:#}", e))),
                    Err(_) => Contribution::Failed(FailureKind::Timeout),
                };
            (provider.id().to_string(), outcome)
        });

        // join_all keeps input order, which is registration order
        let mut merged = Aggregated::default();
        for (provider_id, outcome) in join_all(calls).await {
            match outcome {
                Contribution::Tracks(tracks) => {
                    log::debug!(
                        "[ProviderManager] {:?} on '{}' returned {} tracks",
                        request,
                        provider_id,
                        tracks.len()
                    );
                    merged.tracks.extend(tracks);
                }
                Contribution::Unavailable => {
                    log::debug!("[ProviderManager] '{}' unavailable, skipped", provider_id);
                    merged.unavailable.push(provider_id);
                }
                Contribution::Failed(kind) => {
                    log::warn!(
                        "[ProviderManager] {:?} on '{}' failed: {}",
                        request,
                        provider_id,
                        kind
                    );
                    merged.failures.push(ProviderFailure { provider_id, kind });
                }
            }
        }

        log::info!(
            "[ProviderManager] {:?}: {} tracks from {} providers ({} failed, {} unavailable)",
            request,
            merged.tracks.len(),
            providers.len(),
            merged.failures.len(),
            merged.unavailable.len()
        );
        merged
    }

    async fn call(
        provider: &dyn SourceProvider,
        request: Request<'_>,
    ) -> anyhow::Result<Option<Vec<Track>>> {
        if !provider.is_available().await {
            return Ok(None);
        }
        let tracks = match request {
            Request::Fetch => provider.fetch_songs().await?,
            Request::Search(query) => provider.search_songs(query).await?,
        };
        Ok(Some(tracks))
    }
}
