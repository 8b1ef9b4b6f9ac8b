use std::{fmt, sync::Arc, time::Duration};

use tracing::{debug, warn};

use super::{CacheEntry, CacheStore};
use crate::{error::Result, types::Classification};

/// Verdict lifetime when nothing else is configured.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Thin wrapper the orchestrator uses to reach the cache store.
#[derive(Clone)]
pub struct CacheAdapter {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl fmt::Debug for CacheAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheAdapter")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl CacheAdapter {
    /// Wraps `store`; every write gets `ttl`.
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Cached verdict for `host`. A failing store reads as a miss.
    pub async fn check(&self, host: &str) -> Option<Classification> {
        match self.store.check(host).await {
            Ok(Some(entry)) => {
                debug!(host, classification = %entry.classification, "cache hit");
                Some(entry.classification)
            }
            Ok(None) => {
                debug!(host, "cache miss");
                None
            }
            Err(err) => {
                warn!(host, error = %err, "cache read failed; treating as miss");
                None
            }
        }
    }

    /// Stores the verdict for `host` with the configured TTL.
    pub async fn set(&self, host: &str, classification: Classification) -> Result<()> {
        self.store
            .set(CacheEntry::new(host, classification, self.ttl))
            .await
    }
}
