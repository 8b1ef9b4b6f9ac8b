//! Configuration for bleedwatch.
//!
//! Values are layered the same way everywhere: a `.env` file is folded into
//! the process environment, the environment overrides an optional TOML file,
//! and built-in defaults fill whatever is left. The server applies its CLI
//! flags on top of the loaded [`Config`].

pub mod constants;
pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigLoaderOptions, error::ConfigLoadError};
pub use models::{
    CacheConfig, Config, ConfigMetadata, LogConfig, ProbeConfig, RedirectConfig,
    RedisConfig, ServerConfig,
};
pub use validation::{ConfigWarning, ConfigWarnings};
