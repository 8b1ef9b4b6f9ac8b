//! Probe targets.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Service assumed when the caller does not name one.
pub const DEFAULT_SERVICE: &str = "https";

/// The endpoint being classified.
///
/// `host` is used verbatim as the cache key. No case folding, trailing-dot
/// stripping or port normalization happens here; two spellings of the same
/// endpoint are two cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// `host[:port]`, also the cache key.
    pub host: String,
    /// Protocol spoken before the heartbeat, such as `https` or `smtp`.
    pub service: String,
}

impl Target {
    /// Target for `host` over `service`, both taken as given.
    pub fn new(host: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            service: service.into(),
        }
    }

    /// Bare host probed over the default service.
    pub fn https(host: impl Into<String>) -> Self {
        Self::new(host, DEFAULT_SERVICE)
    }

    /// Interprets the `u` query value, which is either a bare host or a URL.
    ///
    /// When `raw` parses as a URL with a non-empty host, the authority as
    /// written in `raw` (minus any `userinfo@`) becomes the host and the URL
    /// scheme becomes the service. The parser only decides whether a host is
    /// present; its normalized form (lowercased, punycode, default port
    /// dropped) is never used. Anything else is taken literally as the host
    /// with the default service.
    pub fn from_query_value(raw: &str) -> Self {
        let parsed = Url::parse(raw).or_else(|err| {
            // Scheme-relative input such as `//example.com`.
            if raw.starts_with("//") {
                Url::parse(&format!("{DEFAULT_SERVICE}:{raw}"))
            } else {
                Err(err)
            }
        });

        let Ok(url) = parsed else {
            return Self::https(raw);
        };
        if url.host_str().is_none_or(str::is_empty) {
            return Self::https(raw);
        }

        let host = match raw_authority_host(raw) {
            Some(host) => host.to_string(),
            None => return Self::https(raw),
        };
        let service = if url.scheme().is_empty() {
            DEFAULT_SERVICE
        } else {
            url.scheme()
        };
        Self::new(host, service)
    }
}

/// `host[:port]` exactly as written in `raw`: the authority that follows the
/// scheme, ending at the first `/`, `\`, `?` or `#`, without userinfo.
fn raw_authority_host(raw: &str) -> Option<&str> {
    let rest = match raw.strip_prefix("//") {
        Some(rest) => rest,
        None => &raw[raw.find(':')? + 1..],
    };
    let rest = rest.trim_start_matches(['/', '\\']);
    let end = rest.find(['/', '\\', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    let host = match authority.rfind('@') {
        Some(at) => &authority[at + 1..],
        None => authority,
    };
    (!host.is_empty()).then_some(host)
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.host, self.service)
    }
}
