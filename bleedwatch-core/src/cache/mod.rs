//! Look-aside verdict cache.
//!
//! A [`CacheStore`] is the durable key-value backend with per-entry expiry.
//! The orchestrator never talks to it directly; it goes through
//! [`CacheAdapter`], which applies the configured TTL and folds read
//! failures into misses.

mod adapter;
mod memory;
#[cfg(feature = "redis")]
mod redis_store;

pub use adapter::{CacheAdapter, DEFAULT_TTL};
pub use memory::InMemoryCacheStore;
#[cfg(feature = "redis")]
pub use redis_store::{CacheKeys, RedisCacheStore};

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{error::Result, types::Classification};

/// One cached verdict. Owned by the store; callers only see copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Host identity the verdict belongs to.
    pub host: String,
    /// The cached verdict.
    pub classification: Classification,
    /// When the entry was created.
    pub written_at: DateTime<Utc>,
    /// Lifetime counted from `written_at`.
    pub ttl: Duration,
}

impl CacheEntry {
    /// Entry written now.
    pub fn new(
        host: impl Into<String>,
        classification: Classification,
        ttl: Duration,
    ) -> Self {
        Self {
            host: host.into(),
            classification,
            written_at: Utc::now(),
            ttl,
        }
    }

    /// `written_at + ttl`, or `None` when that overflows.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| self.written_at.checked_add_signed(ttl))
    }

    /// An entry whose expiry overflows the calendar never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| expires_at <= now)
    }
}

/// Durable key-value store for verdicts, keyed by host identity.
///
/// Concurrent `check`/`set` on the same key must not corrupt the entry.
/// Nothing makes a `check` followed by a `set` atomic; the last write wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the live entry for `host`, if any.
    async fn check(&self, host: &str) -> Result<Option<CacheEntry>>;

    /// Stores `entry`, replacing whatever was there.
    async fn set(&self, entry: CacheEntry) -> Result<()>;
}
