//! Sanitized response payload.

use serde::{Serialize, Serializer};

use super::Classification;

/// Placeholder for probe-extracted bytes.
///
/// It carries nothing and always serializes as `""`, so a [`ScanResult`]
/// cannot forward leaked memory to a caller even by mistake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizedData;

impl SanitizedData {
    /// Always the empty string.
    pub fn as_str(&self) -> &'static str {
        ""
    }
}

impl Serialize for SanitizedData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Response payload for one classification request.
///
/// Serializes as `{"code": 0|1|2, "data": "", "error": "...", "host": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    #[serde(rename = "code")]
    classification: Classification,
    #[serde(rename = "data")]
    sanitized_data: SanitizedData,
    #[serde(rename = "error")]
    error_text: String,
    host: String,
}

impl ScanResult {
    /// `error_text` is dropped unless the classification is `Error`.
    pub fn new(
        classification: Classification,
        error_text: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        let error_text = match classification {
            Classification::Error => error_text.into(),
            Classification::Vulnerable | Classification::Safe => String::new(),
        };
        Self {
            classification,
            sanitized_data: SanitizedData,
            error_text,
            host: host.into(),
        }
    }

    /// The verdict.
    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Always `""`.
    pub fn sanitized_data(&self) -> &str {
        self.sanitized_data.as_str()
    }

    /// Failure description; empty unless the verdict is `Error`.
    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    /// Host identity echoed back to the caller.
    pub fn host(&self) -> &str {
        &self.host
    }
}
