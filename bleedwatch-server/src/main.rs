//! bleedwatch server.
//!
//! Answers "is this host vulnerable to a heartbeat memory disclosure?" over
//! HTTP. Verdicts are cached for a configurable TTL so repeated lookups of the
//! same host do not re-probe it.
//!
//! ## Configuration
//!
//! Settings are read from `bleedwatch.toml` (or the file named by
//! `BLEEDWATCH_CONFIG` / `--config`), overridden by environment variables and
//! a `.env` file, and finally by the flags below.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use bleedwatch_config::{ConfigLoad, ConfigLoader};
use bleedwatch_server::{
    infra::startup::{ProdStartupHooks, StartupHooks, wire_app_state},
    routes::create_app,
};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "bleedwatch", version)]
#[command(about = "Cached heartbeat vulnerability checks over HTTP")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default log filter when RUST_LOG is unset (overrides config)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config.clone() {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }

    let default_filter = format!("{},tower_http=warn", config.log.level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = config.metadata.config_path.as_ref() {
        info!(path = %path.display(), "configuration file loaded");
    }

    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => {
                warn!(message = %warning.message, "configuration warning")
            }
        }
    }

    let config = Arc::new(config);
    let state = wire_app_state(Arc::clone(&config)).await?;
    ProdStartupHooks.run(&state).await?;

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        address = %addr,
        redirect = %config.redirect.host,
        cache_ttl = ?config.cache.ttl,
        "starting bleedwatch"
    );

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("bleedwatch stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(
            tokio::signal::unix::SignalKind::terminate(),
        ) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
