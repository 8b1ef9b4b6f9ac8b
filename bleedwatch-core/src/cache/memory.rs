use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use super::{CacheEntry, CacheStore};
use crate::error::Result;

/// Process-local [`CacheStore`] with lazy expiry.
///
/// Expired entries are evicted when read, or in bulk by
/// [`purge_expired`](Self::purge_expired).
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryCacheStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before.saturating_sub(self.entries.len())
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn check(&self, host: &str) -> Result<Option<CacheEntry>> {
        let now = Utc::now();
        if let Some(entry) = self.entries.get(host)
            && !entry.is_expired_at(now)
        {
            return Ok(Some(entry.clone()));
        }

        self.entries
            .remove_if(host, |_, entry| entry.is_expired_at(now));
        Ok(None)
    }

    async fn set(&self, entry: CacheEntry) -> Result<()> {
        self.entries.insert(entry.host.clone(), entry);
        Ok(())
    }
}
