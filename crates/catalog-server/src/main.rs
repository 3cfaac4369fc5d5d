//! Catalog server entry point.

use anyhow::{Context, Result};
use catalog_server::fetch::{AnimeFetchSettings, MovieFetchSettings};
use catalog_server::{router, AnimeSearch, AppState, JikanClient, MovieSearch, TmdbClient};
use clap::Parser;
use shared::{Config, LogConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Listen address, overrides server.bind
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?
        .apply_env();

    let mut log_config = LogConfig::from_settings(&config.logging, "catalog-server");
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!("Catalog server starting");
    info!(config_file = %args.config.display(), "Loaded configuration");

    if config.tmdb.api_key.is_empty() {
        warn!(
            env = shared::config::TMDB_API_KEY_ENV,
            "No TMDB API key configured, movie requests will fail"
        );
    }

    let tmdb = TmdbClient::from_config(&config.tmdb).context("Failed to create TMDB client")?;
    let jikan = JikanClient::from_config(&config.jikan).context("Failed to create Jikan client")?;

    let movies = MovieSearch::new(
        Arc::new(tmdb),
        MovieFetchSettings::from_config(&config.tmdb),
        &config.cache,
    );
    let anime = AnimeSearch::new(
        Arc::new(jikan),
        AnimeFetchSettings::from_config(&config.jikan),
        &config.cache,
    );

    info!(
        ttl_secs = config.cache.expiration_seconds,
        master_list_size = config.cache.master_list_size,
        "Master list cache ready"
    );

    let app = router(AppState {
        movies: Arc::new(movies),
        anime: Arc::new(anime),
    });

    let bind = args.bind.unwrap_or(config.server.bind);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Catalog server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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
    info!("Shutdown signal received");
}
