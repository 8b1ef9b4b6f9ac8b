use std::{fmt, sync::Arc};

use bleedwatch_config::Config;
use bleedwatch_core::{
    ClassificationOrchestrator, InMemoryCacheStore, MetricsAggregator,
};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ClassificationOrchestrator>,
    pub metrics: Arc<MetricsAggregator>,
    pub config: Arc<Config>,
    /// Set when verdicts live in process memory rather than Redis; the
    /// startup hooks sweep it periodically.
    pub memory_cache: Option<Arc<InMemoryCacheStore>>,
}

impl AppState {
    pub fn redirect_host(&self) -> &str {
        &self.config.redirect.host
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("orchestrator", &self.orchestrator)
            .field("memory_cache", &self.memory_cache.is_some())
            .finish_non_exhaustive()
    }
}
