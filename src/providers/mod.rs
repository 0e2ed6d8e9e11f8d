//! Track sources and the aggregator that queries them all at once.

pub mod local;
pub mod manager;
pub mod traits;
pub mod types;

pub use local::LocalProvider;
pub use manager::{ProviderManager, DEFAULT_PROVIDER_TIMEOUT};
pub use traits::SourceProvider;
pub use types::{Aggregated, FailureKind, ProviderFailure};
