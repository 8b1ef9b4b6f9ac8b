use url::Url;

use crate::models::Config;

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

/// Checks that do not stop startup but usually point at a mistake.
pub fn apply_guard_rails(config: &Config) -> ConfigWarnings {
    let mut warnings = ConfigWarnings::default();

    if config.cache.ttl.is_zero() {
        warnings.push_with_hint(
            "cache.ttl is zero; every request will probe the target",
            "Set CACHE_TTL (for example `10m`) to reuse recent results",
        );
    }

    if Url::parse(&config.redirect.host)
        .map(|url| !matches!(url.scheme(), "http" | "https"))
        .unwrap_or(true)
    {
        warnings.push_with_hint(
            format!(
                "redirect.host '{}' has no http(s) scheme; browsers will treat it as a relative path",
                config.redirect.host
            ),
            "Use an absolute URL such as https://bleedwatch.example",
        );
    }

    if config.redis.is_none() {
        warnings.push(
            "REDIS_URL not configured; results are cached in process memory and lost on restart",
        );
    }

    if config.probe.payload.is_empty() {
        warnings.push("probe.payload is empty; the probe service will echo nothing");
    }

    warnings
}
