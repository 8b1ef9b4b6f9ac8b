use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use bleedwatch_config::Config;
use bleedwatch_core::{
    CacheAdapter, CacheStore, ClassificationOrchestrator, HttpProber,
    InMemoryCacheStore, MetricsAggregator, RedisCacheStore,
};
use tracing::{debug, info};

use crate::infra::app_state::AppState;

/// How often the in-process verdict cache drops expired entries.
pub const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Builds the collaborators named by `config` and the state shared by handlers.
///
/// A configured Redis URL must be reachable; otherwise verdicts are kept in
/// process memory.
pub async fn wire_app_state(config: Arc<Config>) -> Result<AppState> {
    let metrics = Arc::new(MetricsAggregator::new());

    let (store, memory_cache): (Arc<dyn CacheStore>, _) = match &config.redis {
        Some(redis) => {
            let store = RedisCacheStore::connect(&redis.url)
                .await
                .context("failed to connect to Redis")?;
            (Arc::new(store), None)
        }
        None => {
            info!("using in-process verdict cache");
            let store = Arc::new(InMemoryCacheStore::new());
            (store.clone(), Some(store))
        }
    };

    let prober =
        HttpProber::new(config.probe.endpoint.clone(), config.probe.timeout)
            .context("failed to build probe client")?;
    info!(endpoint = %config.probe.endpoint, timeout = ?config.probe.timeout, "probe service configured");

    let orchestrator = ClassificationOrchestrator::new(
        CacheAdapter::new(store, config.cache.ttl),
        Arc::new(prober),
        Arc::clone(&metrics),
    )
    .with_payload(config.probe.payload.as_bytes().to_vec());

    Ok(AppState {
        orchestrator: Arc::new(orchestrator),
        metrics,
        config,
        memory_cache,
    })
}

#[async_trait]
pub trait StartupHooks: Send + Sync {
    async fn run(&self, state: &AppState) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct ProdStartupHooks;

#[async_trait]
impl StartupHooks for ProdStartupHooks {
    async fn run(&self, state: &AppState) -> Result<()> {
        if let Some(store) = state.memory_cache.clone() {
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(CACHE_SWEEP_INTERVAL);
                loop {
                    interval.tick().await;
                    let purged = store.purge_expired();
                    if purged > 0 {
                        debug!(purged, remaining = store.len(), "swept expired verdicts");
                    }
                }
            });
        }

        Ok(())
    }
}
