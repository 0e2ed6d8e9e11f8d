use serde::Serialize;
use std::fmt;

use crate::errors::PlayerError;
use crate::models::Track;

/// Why a provider contributed nothing to an aggregated call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Error(String),
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Error(msg) => write!(f, "{}", msg),
            FailureKind::Timeout => write!(f, "timed out"),
        }
    }
}

/// A provider failure absorbed by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderFailure {
    pub provider_id: String,
    pub kind: FailureKind,
}

impl From<&ProviderFailure> for PlayerError {
    fn from(failure: &ProviderFailure) -> Self {
        PlayerError::Provider {
            provider: failure.provider_id.clone(),
            message: failure.kind.to_string(),
        }
    }
}

/// Merged result of a fan-out call, in provider registration order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregated {
    pub tracks: Vec<Track>,
    /// Providers that failed or timed out. Unavailable providers are not
    /// failures and do not appear here.
    pub failures: Vec<ProviderFailure>,
    /// Providers that were skipped because they reported unavailable.
    pub unavailable: Vec<String>,
}

impl Aggregated {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.unavailable.is_empty()
    }

    /// Failures as crate errors, for callers that want to surface them.
    pub fn errors(&self) -> Vec<PlayerError> {
        self.failures.iter().map(PlayerError::from).collect()
    }
}
