//! Process-lifetime outcome counters.
//!
//! Counters only ever go up. There is no reset and no decrement; restart the
//! process to start from zero.

use std::{
    collections::BTreeMap,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::Serialize;

use crate::types::Classification;

/// Named counters exposed by `/metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Probes run (cache misses).
    Total,
    /// Probes that returned `Vulnerable`.
    Vulnerable,
    /// Probes that returned `Safe`.
    Safe,
    /// Probes that returned `Error`.
    Error,
    /// Requests answered from the cache.
    Cached,
}

impl Counter {
    /// Every counter, in storage order.
    pub const ALL: [Counter; 5] = [
        Counter::Total,
        Counter::Vulnerable,
        Counter::Safe,
        Counter::Error,
        Counter::Cached,
    ];

    /// Key used in the `/metrics` object.
    pub fn name(self) -> &'static str {
        match self {
            Counter::Total => "total",
            Counter::Vulnerable => "vulnerable",
            Counter::Safe => "safe",
            Counter::Error => "error",
            Counter::Cached => "cached",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl From<Classification> for Counter {
    fn from(classification: Classification) -> Self {
        match classification {
            Classification::Vulnerable => Counter::Vulnerable,
            Classification::Safe => Counter::Safe,
            Classification::Error => Counter::Error,
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lock-free counter set shared by every request.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    counters: [AtomicU64; Counter::ALL.len()],
}

impl MetricsAggregator {
    /// All counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one to `counter`.
    pub fn increment(&self, counter: Counter) {
        self.counters[counter.index()].fetch_add(1, Ordering::Relaxed);
    }

    /// Books one completed probe: `total` first, then its verdict.
    pub fn record_probe(&self, classification: Classification) {
        self.increment(Counter::Total);
        self.increment(Counter::from(classification));
    }

    /// Current value of `counter`.
    pub fn get(&self, counter: Counter) -> u64 {
        self.counters[counter.index()].load(Ordering::Relaxed)
    }

    /// Copies every counter. Each value is read atomically; the set as a
    /// whole is not a single instant across concurrent increments.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot(
            Counter::ALL
                .iter()
                .map(|counter| (counter.name().to_string(), self.get(*counter)))
                .collect(),
        )
    }
}

/// Immutable counter values, serialized as a flat `{name: value}` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetricsSnapshot(BTreeMap<String, u64>);

impl MetricsSnapshot {
    /// Value of `counter` at snapshot time.
    pub fn get(&self, counter: Counter) -> u64 {
        self.0.get(counter.name()).copied().unwrap_or(0)
    }

    /// `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn snapshot_lists_every_counter() {
        let metrics = MetricsAggregator::new();
        metrics.increment(Counter::Cached);
        metrics.record_probe(Classification::Error);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.iter().count(), 5);
        assert_eq!(snapshot.get(Counter::Total), 1);
        assert_eq!(snapshot.get(Counter::Error), 1);
        assert_eq!(snapshot.get(Counter::Cached), 1);
        assert_eq!(snapshot.get(Counter::Safe), 0);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cached": 1, "error": 1, "safe": 0, "total": 1, "vulnerable": 0
            })
        );
    }

    #[test]
    fn snapshot_is_detached_from_later_updates() {
        let metrics = MetricsAggregator::new();
        let before = metrics.snapshot();
        metrics.increment(Counter::Total);
        assert_eq!(before.get(Counter::Total), 0);
        assert_eq!(metrics.snapshot().get(Counter::Total), 1);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let metrics = Arc::new(MetricsAggregator::new());
        let threads = 8;
        let per_thread = 10_000;

        std::thread::scope(|scope| {
            for i in 0..threads {
                let metrics = Arc::clone(&metrics);
                scope.spawn(move || {
                    let classification = Classification::ALL[i % 3];
                    for _ in 0..per_thread {
                        metrics.record_probe(classification);
                    }
                });
            }
        });

        let snapshot = metrics.snapshot();
        let total = (threads * per_thread) as u64;
        assert_eq!(snapshot.get(Counter::Total), total);
        assert_eq!(
            snapshot.get(Counter::Vulnerable)
                + snapshot.get(Counter::Safe)
                + snapshot.get(Counter::Error),
            total
        );
    }
}
