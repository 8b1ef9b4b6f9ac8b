use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use axum_test::TestServer;
use bleedwatch_config::Config;
use bleedwatch_core::{
    CacheAdapter, CacheEntry, CacheError, CacheStore,
    ClassificationOrchestrator, InMemoryCacheStore, MetricsAggregator,
    ProbeReport, ProbeSignal, Prober, Target,
};
use bleedwatch_server::{AppState, routes::create_app};

#[allow(unused)]
pub const REDIRECT_HOST: &str = "https://bleedwatch.example";

/// Prober double that answers every call with the same report and records
/// what it was asked.
#[derive(Debug)]
pub struct StubProber {
    report: ProbeReport,
    calls: AtomicUsize,
    seen: Mutex<Vec<(Target, Vec<u8>, bool)>>,
    delay: Option<Duration>,
}

#[allow(unused)]
impl StubProber {
    pub fn new(data: &str, signal: ProbeSignal) -> Self {
        Self {
            report: ProbeReport::new(data, signal),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(Target, Vec<u8>, bool)> {
        self.seen.lock().expect("seen lock").clone()
    }
}

#[async_trait]
impl Prober for StubProber {
    async fn probe(
        &self,
        target: &Target,
        payload: &[u8],
        skip: bool,
    ) -> ProbeReport {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().expect("seen lock").push((
            target.clone(),
            payload.to_vec(),
            skip,
        ));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.report.clone()
    }
}

/// Cache store whose reads miss and whose writes always fail.
#[allow(unused)]
#[derive(Debug, Default)]
pub struct BrokenCacheStore;

#[async_trait]
impl CacheStore for BrokenCacheStore {
    async fn check(
        &self,
        _host: &str,
    ) -> bleedwatch_core::Result<Option<CacheEntry>> {
        Ok(None)
    }

    async fn set(&self, _entry: CacheEntry) -> bleedwatch_core::Result<()> {
        Err(CacheError::Backend("write refused".into()))
    }
}

#[allow(unused)]
pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub prober: Arc<StubProber>,
}

#[allow(unused)]
pub fn build_test_app(prober: StubProber) -> TestApp {
    build_test_app_with_store(prober, Arc::new(InMemoryCacheStore::new()))
}

#[allow(unused)]
pub fn build_test_app_with_store(
    prober: StubProber,
    store: Arc<dyn CacheStore>,
) -> TestApp {
    let mut config = Config::default();
    config.redirect.host = REDIRECT_HOST.to_string();
    let config = Arc::new(config);

    let prober = Arc::new(prober);
    let metrics = Arc::new(MetricsAggregator::new());
    let orchestrator = ClassificationOrchestrator::new(
        CacheAdapter::new(store, config.cache.ttl),
        prober.clone(),
        Arc::clone(&metrics),
    );

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        metrics,
        config,
        memory_cache: None,
    };

    let server =
        TestServer::new(create_app(state.clone())).expect("build test server");

    TestApp {
        server,
        state,
        prober,
    }
}
