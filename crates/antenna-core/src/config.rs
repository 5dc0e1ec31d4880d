//! Matcher configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default relationship cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;
pub const DEFAULT_LOADER_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_CONCURRENCY: usize = 16;

/// Configuration for [`crate::AntennaMatcher`] and its relationship cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatcherConfig {
    /// Host of the local instance, used for authors without a host.
    pub local_host: String,
    pub cache_ttl_secs: u64,
    /// Timeout applied to every loader call. A timed-out load fails the
    /// guard that needed it.
    pub loader_timeout_ms: u64,
    /// Maximum antennas evaluated concurrently for one note.
    pub concurrency: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            local_host: "localhost".to_string(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            loader_timeout_ms: DEFAULT_LOADER_TIMEOUT_MS,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl MatcherConfig {
    pub fn with_local_host(mut self, host: impl Into<String>) -> Self {
        self.local_host = host.into();
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn loader_timeout(&self) -> Duration {
        Duration::from_millis(self.loader_timeout_ms)
    }

    /// Concurrency clamped to at least one.
    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}
