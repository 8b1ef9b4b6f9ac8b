//! Classification orchestrator.
//!
//! Decides per request whether a cached verdict can be trusted or a live
//! probe has to run, books the outcome in the counters and the cache, and
//! builds the sanitized [`ScanResult`].
//!
//! There is no single-flight: concurrent misses for one host each run their
//! own probe, each count towards `total`, and each write the cache (last
//! write wins). Duplicate probes are therefore possible while the cache for
//! a host is being refilled.

use std::{fmt, sync::Arc};

use tracing::{debug, info, warn};

use crate::{
    cache::CacheAdapter,
    metrics::{Counter, MetricsAggregator},
    probe::{DEFAULT_PAYLOAD, ProbeReport, ProbeSignal, Prober},
    types::{Classification, ScanResult, Target},
};

/// Error text used when a probe fails without describing why.
pub const UNDESCRIBED_FAILURE: &str = "probe failed";

/// Answers classification requests from the cache or a fresh probe.
pub struct ClassificationOrchestrator {
    cache: CacheAdapter,
    prober: Arc<dyn Prober>,
    metrics: Arc<MetricsAggregator>,
    payload: Vec<u8>,
}

impl fmt::Debug for ClassificationOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassificationOrchestrator")
            .field("cache", &self.cache)
            .field("payload_len", &self.payload.len())
            .finish_non_exhaustive()
    }
}

impl ClassificationOrchestrator {
    /// Orchestrator sending the default payload.
    pub fn new(
        cache: CacheAdapter,
        prober: Arc<dyn Prober>,
        metrics: Arc<MetricsAggregator>,
    ) -> Self {
        Self {
            cache,
            prober,
            metrics,
            payload: DEFAULT_PAYLOAD.to_vec(),
        }
    }

    /// Replaces the marker sent inside the heartbeat request.
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Counters this orchestrator books into.
    pub fn metrics(&self) -> &Arc<MetricsAggregator> {
        &self.metrics
    }

    /// Classifies `target`, probing only on a cache miss.
    ///
    /// Never fails: probe failures become [`Classification::Error`] and cache
    /// write failures are logged and otherwise ignored.
    pub async fn classify(&self, target: &Target, skip: bool) -> ScanResult {
        if let Some(classification) = self.cache.check(&target.host).await {
            self.metrics.increment(Counter::Cached);
            return ScanResult::new(classification, "", target.host.clone());
        }

        info!(host = %target.host, service = %target.service, "checking host");
        let ProbeReport { data, signal } =
            self.prober.probe(target, &self.payload, skip).await;

        let classification = Classification::from_signal(&signal);
        self.metrics.record_probe(classification);

        if let Err(err) = self.cache.set(&target.host, classification).await {
            warn!(host = %target.host, error = %err, "cache write failed");
        }

        let error_text = log_outcome(target, &signal, skip);

        // Probe output stops here, whatever the verdict.
        if !data.is_empty() {
            debug!(host = %target.host, bytes = data.len(), "discarding probe data");
        }
        drop(data);

        ScanResult::new(classification, error_text, target.host.clone())
    }
}

/// Logs the verdict and returns the error text for the response.
fn log_outcome(target: &Target, signal: &ProbeSignal, skip: bool) -> String {
    match signal {
        ProbeSignal::Vulnerable => {
            info!(host = %target.host, service = %target.service, skip, "VULNERABLE");
            String::new()
        }
        ProbeSignal::Safe | ProbeSignal::Closed => {
            info!(host = %target.host, service = %target.service, "SAFE");
            String::new()
        }
        ProbeSignal::Failed(text) => {
            if signal.is_mismatch() {
                info!(host = %target.host, service = %target.service, "MISMATCH");
            } else {
                info!(host = %target.host, service = %target.service, error = %text, "ERROR");
            }
            if text.is_empty() {
                UNDESCRIBED_FAILURE.to_string()
            } else {
                text.clone()
            }
        }
    }
}
