pub mod error;

use once_cell::sync::Lazy;
use std::{fs, path::PathBuf, time::Duration};
use url::Url;

use self::error::ConfigLoadError;
use crate::{
    constants::{
        DEFAULT_CACHE_TTL, DEFAULT_LOG_LEVEL, DEFAULT_PROBE_PAYLOAD,
        DEFAULT_PROBE_TIMEOUT, DEFAULT_REDIRECT_HOST, DEFAULT_SERVER_HOST,
        DEFAULT_SERVER_PORT,
    },
    models::{
        CacheConfig, Config, ConfigMetadata, LogConfig, ProbeConfig,
        RedirectConfig, RedisConfig, ServerConfig, default_probe_endpoint,
        sources::{EnvConfig, FileConfig},
    },
    validation::{self, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("bleedwatch.toml"),
        PathBuf::from("config/bleedwatch.toml"),
    ]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let env_config = EnvConfig::gather();
        let (file_config, config_path) = self.load_file_config(&env_config)?;

        let (config, warnings) = compose_config(
            file_config,
            env_config,
            config_path,
            env_file_loaded,
        )?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env_config: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let mut source = ConfigPathSource::default();

        if let Some(explicit) = &self.options.config_path {
            source.explicit = Some(explicit.clone());
        } else if let Some(from_env) = &env_config.config_path {
            source.env = Some(from_env.clone());
        }

        if source.is_empty() {
            source.default = DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
                .cloned();
        }

        let Some((path, provenance)) = source.resolved_path() else {
            return Ok((None, None));
        };

        if !path.exists() {
            if provenance.is_explicit() {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents = fs::read_to_string(&path).map_err(|source| {
            ConfigLoadError::Io {
                path: path.clone(),
                source,
            }
        })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|source| {
                ConfigLoadError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
    env_file_loaded: bool,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if config_path.is_none() {
        warnings.push_with_hint(
            "No bleedwatch.toml detected; using environment variables and defaults",
            "Create bleedwatch.toml or set BLEEDWATCH_CONFIG to pin settings in a file",
        );
    }

    let FileConfig {
        server: file_server,
        redirect: file_redirect,
        cache: file_cache,
        redis: file_redis,
        probe: file_probe,
        log: file_log,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
        port: env
            .server_port
            .or(file_server.port)
            .unwrap_or(DEFAULT_SERVER_PORT),
    };

    let redirect = RedirectConfig {
        host: env
            .redirect_host
            .or(file_redirect.host)
            .unwrap_or_else(|| DEFAULT_REDIRECT_HOST.to_string()),
    };

    let cache = CacheConfig {
        ttl: parse_duration(
            "cache.ttl",
            env.cache_ttl.or(file_cache.ttl),
            DEFAULT_CACHE_TTL,
        )?,
    };

    let redis = env
        .redis_url
        .map(|url| RedisConfig { url })
        .or_else(|| file_redis.map(|r| RedisConfig { url: r.url }))
        .filter(|r| !r.url.trim().is_empty());

    let probe = ProbeConfig {
        endpoint: parse_probe_endpoint(
            env.probe_endpoint.or(file_probe.endpoint),
        )?,
        timeout: parse_duration(
            "probe.timeout",
            env.probe_timeout.or(file_probe.timeout),
            DEFAULT_PROBE_TIMEOUT,
        )?,
        payload: env
            .probe_payload
            .or(file_probe.payload)
            .unwrap_or_else(|| DEFAULT_PROBE_PAYLOAD.to_string()),
    };

    let log = LogConfig {
        level: env
            .log_level
            .or(file_log.level)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
    };

    let config = Config {
        server,
        redirect,
        cache,
        redis,
        probe,
        log,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded,
        },
    };

    warnings.extend(validation::apply_guard_rails(&config));

    Ok((config, warnings))
}

fn parse_duration(
    key: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigLoadError> {
    match raw {
        None => Ok(default),
        Some(value) => humantime::parse_duration(value.trim()).map_err(
            |source| ConfigLoadError::InvalidDuration { key, value, source },
        ),
    }
}

fn parse_probe_endpoint(raw: Option<String>) -> Result<Url, ConfigLoadError> {
    let Some(value) = raw else {
        return Ok(default_probe_endpoint());
    };

    let url = Url::parse(value.trim()).map_err(|source| {
        ConfigLoadError::InvalidUrl {
            key: "probe.endpoint",
            value: value.clone(),
            source,
        }
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigLoadError::UnsupportedProbeScheme {
            scheme: other.to_string(),
        }),
    }
}

#[derive(Debug, Default)]
struct ConfigPathSource {
    explicit: Option<PathBuf>,
    env: Option<PathBuf>,
    default: Option<PathBuf>,
}

impl ConfigPathSource {
    fn is_empty(&self) -> bool {
        self.explicit.is_none() && self.env.is_none() && self.default.is_none()
    }

    fn resolved_path(&self) -> Option<(PathBuf, ConfigPathProvenance)> {
        if let Some(path) = &self.explicit {
            return Some((path.clone(), ConfigPathProvenance::Explicit));
        }
        if let Some(path) = &self.env {
            return Some((path.clone(), ConfigPathProvenance::Env));
        }
        if let Some(path) = &self.default {
            return Some((path.clone(), ConfigPathProvenance::Default));
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigPathProvenance {
    Explicit,
    Env,
    Default,
}

impl ConfigPathProvenance {
    fn is_explicit(self) -> bool {
        matches!(
            self,
            ConfigPathProvenance::Explicit | ConfigPathProvenance::Env
        )
    }
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
