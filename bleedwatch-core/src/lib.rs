//! Core library for bleedwatch.
//!
//! Given a remote endpoint, bleedwatch decides whether it is vulnerable to a
//! heartbeat memory-disclosure probe and reports a tri-state verdict. The
//! pieces in this crate are:
//!
//! - [`types`]: targets, classifications and the sanitized [`ScanResult`].
//! - [`cache`]: the look-aside verdict cache ([`CacheStore`] backends and the
//!   TTL-applying [`CacheAdapter`]).
//! - [`probe`]: the [`Prober`] capability and its HTTP-delegating
//!   implementation.
//! - [`metrics`]: process-lifetime outcome counters.
//! - [`orchestration`]: the [`ClassificationOrchestrator`] tying it together.

pub mod cache;
pub mod error;
pub mod metrics;
pub mod orchestration;
pub mod probe;
pub mod types;

pub use cache::{CacheAdapter, CacheEntry, CacheStore, InMemoryCacheStore};
#[cfg(feature = "redis")]
pub use cache::RedisCacheStore;
pub use error::{CacheError, Result};
pub use metrics::{Counter, MetricsAggregator, MetricsSnapshot};
pub use orchestration::ClassificationOrchestrator;
pub use probe::{HttpProber, ProbeReport, ProbeSignal, Prober};
pub use types::{Classification, ScanResult, Target};
