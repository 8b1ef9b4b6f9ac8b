use std::fmt;

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};
use tracing::{debug, info};

use super::{CacheEntry, CacheStore};
use crate::error::{CacheError, Result};

/// Redis-backed [`CacheStore`]. Expiry is Redis' own key TTL.
#[derive(Clone)]
pub struct RedisCacheStore {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisCacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCacheStore")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisCacheStore {
    /// Opens a managed connection; fails when Redis is unreachable.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        info!("Connecting to Redis cache at {}", redis_url);

        let client = redis::Client::open(redis_url).map_err(|e| {
            CacheError::Connection(format!("Failed to create Redis client: {e}"))
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::Connection(format!("Failed to connect to Redis: {e}"))
        })?;

        info!("Successfully connected to Redis cache");

        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn check(&self, host: &str) -> Result<Option<CacheEntry>> {
        let key = CacheKeys::host(host);
        debug!("Cache GET: {}", key);

        let mut conn = self.conn.clone();
        let data: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis GET failed: {e}")))?;

        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, entry: CacheEntry) -> Result<()> {
        let key = CacheKeys::host(&entry.host);
        let Some(seconds) = CacheKeys::expiry_seconds(&entry) else {
            debug!("Cache SET skipped for {} (zero TTL)", key);
            return Ok(());
        };
        debug!("Cache SET: {} (TTL: {}s)", key, seconds);

        let json = serde_json::to_string(&entry)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(&key, json, seconds)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis SETEX failed: {e}")))?;

        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
/// Redis key layout for verdicts.
pub struct CacheKeys;

impl CacheKeys {
    /// `bleed:host:{host}`.
    pub fn host(host: &str) -> String {
        format!("bleed:host:{host}")
    }

    /// Whole seconds for `SET EX`, rounded up. `None` for a zero TTL,
    /// which Redis rejects and which would expire at once anyway.
    pub fn expiry_seconds(entry: &CacheEntry) -> Option<u64> {
        if entry.ttl.is_zero() {
            return None;
        }
        let mut seconds = entry.ttl.as_secs();
        if entry.ttl.subsec_nanos() > 0 {
            seconds += 1;
        }
        Some(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Classification;
    use std::time::Duration;

    #[test]
    fn host_keys_are_namespaced_verbatim() {
        assert_eq!(CacheKeys::host("Example.COM:443"), "bleed:host:Example.COM:443");
    }

    #[test]
    fn expiry_rounds_up_to_whole_seconds() {
        let entry = |ttl| CacheEntry::new("h", Classification::Safe, ttl);
        assert_eq!(CacheKeys::expiry_seconds(&entry(Duration::ZERO)), None);
        assert_eq!(
            CacheKeys::expiry_seconds(&entry(Duration::from_millis(1))),
            Some(1)
        );
        assert_eq!(
            CacheKeys::expiry_seconds(&entry(Duration::from_secs(600))),
            Some(600)
        );
        assert_eq!(
            CacheKeys::expiry_seconds(&entry(Duration::from_millis(1500))),
            Some(2)
        );
    }
}
