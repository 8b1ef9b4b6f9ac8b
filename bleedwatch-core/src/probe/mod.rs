//! Probe capability.
//!
//! The heartbeat exchange itself lives behind [`Prober`]; this crate only
//! consumes its outcome. [`HttpProber`] delegates the exchange to an external
//! probe service.

mod http;

pub use http::HttpProber;

use std::fmt;

use async_trait::async_trait;

use crate::types::Target;

/// Failure text the probe reports when the peer's heartbeat response did not
/// line up with the request and the check should be repeated.
pub const RETRY_MISMATCH: &str = "Please try again";

/// Default marker carried in the heartbeat request.
pub const DEFAULT_PAYLOAD: &[u8] = b"bleedwatch.probe";

/// Outcome of a single probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeSignal {
    /// The heartbeat leaked memory; the target is vulnerable.
    Vulnerable,
    /// The target answered and did not leak.
    Safe,
    /// The target closed the connection on the malformed heartbeat.
    Closed,
    /// Anything else, with a human readable description.
    Failed(String),
}

impl ProbeSignal {
    /// Shorthand for [`ProbeSignal::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        ProbeSignal::Failed(message.into())
    }

    /// Whether this is the transient request/response mismatch failure.
    pub fn is_mismatch(&self) -> bool {
        matches!(self, ProbeSignal::Failed(text) if text == RETRY_MISMATCH)
    }
}

impl fmt::Display for ProbeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeSignal::Vulnerable => f.write_str("vulnerable"),
            ProbeSignal::Safe => f.write_str("safe"),
            ProbeSignal::Closed => f.write_str("closed"),
            ProbeSignal::Failed(text) => write!(f, "failed: {text}"),
        }
    }
}

/// What a probe returned: any bytes it extracted and the classified signal.
///
/// `data` may contain another process's memory. It must never reach a
/// response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Raw bytes the probe extracted, if any.
    pub data: String,
    /// The outcome.
    pub signal: ProbeSignal,
}

impl ProbeReport {
    /// Report carrying extracted `data`.
    pub fn new(data: impl Into<String>, signal: ProbeSignal) -> Self {
        Self {
            data: data.into(),
            signal,
        }
    }

    /// Report with no extracted data.
    pub fn signal(signal: ProbeSignal) -> Self {
        Self::new(String::new(), signal)
    }
}

/// Performs one probe attempt against a target.
///
/// Implementations own their own latency bound; callers wait for as long as
/// `probe` takes. Every failure to reach a verdict must come back as
/// [`ProbeSignal::Failed`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Prober: Send + Sync {
    /// `skip` asks the probe not to run a redundant confirmation round.
    async fn probe(&self, target: &Target, payload: &[u8], skip: bool) -> ProbeReport;
}
