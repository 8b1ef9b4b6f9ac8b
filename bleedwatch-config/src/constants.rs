use std::time::Duration;

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8082;
pub const DEFAULT_REDIRECT_HOST: &str = "http://localhost";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_PROBE_ENDPOINT: &str = "http://127.0.0.1:8083/probe";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PROBE_PAYLOAD: &str = "bleedwatch.probe";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable naming the TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "BLEEDWATCH_CONFIG";
