//! The tri-state verdict.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::probe::ProbeSignal;

/// Tri-state verdict for a target.
///
/// The numeric codes are part of the wire contract (`code` in responses and
/// the value persisted in the cache) and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Classification {
    /// The probe extracted memory from the target.
    Vulnerable = 0,
    /// The target did not leak.
    Safe = 1,
    /// No verdict could be reached.
    Error = 2,
}

impl Classification {
    /// Every verdict, in code order.
    pub const ALL: [Classification; 3] = [
        Classification::Vulnerable,
        Classification::Safe,
        Classification::Error,
    ];

    /// Wire code: `0` vulnerable, `1` safe, `2` error.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Maps a probe outcome onto a verdict. `Safe` and `Closed` are both
    /// expected negatives; every failure is an `Error`, never a silent
    /// `Safe` or `Vulnerable`.
    pub fn from_signal(signal: &ProbeSignal) -> Self {
        match signal {
            ProbeSignal::Vulnerable => Classification::Vulnerable,
            ProbeSignal::Safe | ProbeSignal::Closed => Classification::Safe,
            ProbeSignal::Failed(_) => Classification::Error,
        }
    }

    /// Lowercase name, also used as the counter name.
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Vulnerable => "vulnerable",
            Classification::Safe => "safe",
            Classification::Error => "error",
        }
    }
}

impl From<Classification> for u8 {
    fn from(value: Classification) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for Classification {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        match value {
            0 => Ok(Classification::Vulnerable),
            1 => Ok(Classification::Safe),
            2 => Ok(Classification::Error),
            other => Err(format!("unknown classification code {other}")),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
