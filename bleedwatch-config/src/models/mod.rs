pub mod sources;

use std::{path::PathBuf, time::Duration};

use url::Url;

use crate::constants::{
    DEFAULT_CACHE_TTL, DEFAULT_LOG_LEVEL, DEFAULT_PROBE_ENDPOINT,
    DEFAULT_PROBE_PAYLOAD, DEFAULT_PROBE_TIMEOUT, DEFAULT_REDIRECT_HOST,
    DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
};

/// Fully resolved runtime configuration. Read-only after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub redirect: RedirectConfig,
    pub cache: CacheConfig,
    pub redis: Option<RedisConfig>,
    pub probe: ProbeConfig,
    pub log: LogConfig,
    pub metadata: ConfigMetadata,
}

impl Config {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
            },
            redirect: RedirectConfig {
                host: DEFAULT_REDIRECT_HOST.to_string(),
            },
            cache: CacheConfig {
                ttl: DEFAULT_CACHE_TTL,
            },
            redis: None,
            probe: ProbeConfig::default(),
            log: LogConfig {
                level: DEFAULT_LOG_LEVEL.to_string(),
            },
            metadata: ConfigMetadata::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Where `/` and unknown paths send the browser.
#[derive(Debug, Clone)]
pub struct RedirectConfig {
    pub host: String,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub endpoint: Url,
    pub timeout: Duration,
    pub payload: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_probe_endpoint(),
            timeout: DEFAULT_PROBE_TIMEOUT,
            payload: DEFAULT_PROBE_PAYLOAD.to_string(),
        }
    }
}

pub(crate) fn default_probe_endpoint() -> Url {
    // Constant input; a failure here is a typo in DEFAULT_PROBE_ENDPOINT.
    Url::parse(DEFAULT_PROBE_ENDPOINT).unwrap_or_else(|err| {
        unreachable!("DEFAULT_PROBE_ENDPOINT is not a valid URL: {err}")
    })
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
