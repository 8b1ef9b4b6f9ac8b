use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::CONFIG_PATH_ENV;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub redirect: FileRedirectConfig,
    #[serde(default)]
    pub cache: FileCacheConfig,
    pub redis: Option<FileRedisConfig>,
    #[serde(default)]
    pub probe: FileProbeConfig,
    #[serde(default)]
    pub log: FileLogConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileRedirectConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCacheConfig {
    /// Humantime duration such as `10m` or `90s`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FileRedisConfig {
    pub url: String,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileProbeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileLogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub redirect_host: Option<String>,
    pub cache_ttl: Option<String>,
    pub redis_url: Option<String>,
    pub probe_endpoint: Option<String>,
    pub probe_timeout: Option<String>,
    pub probe_payload: Option<String>,
    pub log_level: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: non_empty_var(CONFIG_PATH_ENV).map(PathBuf::from),
            server_host: non_empty_var("SERVER_HOST"),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.trim().parse().ok()),
            redirect_host: non_empty_var("REDIRECT_HOST"),
            cache_ttl: non_empty_var("CACHE_TTL"),
            redis_url: non_empty_var("REDIS_URL"),
            probe_endpoint: non_empty_var("PROBE_ENDPOINT"),
            probe_timeout: non_empty_var("PROBE_TIMEOUT"),
            probe_payload: non_empty_var("PROBE_PAYLOAD"),
            log_level: non_empty_var("LOG_LEVEL"),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
