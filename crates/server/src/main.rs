use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seedwatch_core::{
    history::{HistoryStore, SqliteHistoryStore},
    load_config,
    reachability::DEFAULT_SWEEP_INTERVAL,
    validate_config, MemoryCache, TcpProber,
};
use seedwatch_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("SEEDWATCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!(
        enabled = config.hitrun.enabled,
        seedtime = config.hitrun.seedtime,
        buffer = config.hitrun.buffer,
        "Hit-and-run policy"
    );
    info!(
        enabled = config.announce.connectable_check,
        interval = config.announce.connectable_check_interval,
        max_concurrent_probes = config.announce.max_concurrent_probes,
        "Connectability checks"
    );

    // Create SQLite history store
    let store: Arc<dyn HistoryStore> = Arc::new(
        SqliteHistoryStore::new(&config.database.path)
            .context("Failed to create history store")?,
    );
    info!("History store initialized");

    let cache = Arc::new(MemoryCache::new());
    spawn_cache_purge(Arc::clone(&cache));

    let state = Arc::new(AppState::new(
        config.clone(),
        store,
        cache,
        Arc::new(TcpProber::new()),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Periodically drop expired connectability results.
fn spawn_cache_purge(cache: Arc<MemoryCache>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(DEFAULT_SWEEP_INTERVAL);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.purge_expired().await;
            if removed > 0 {
                debug!(removed, "Purged expired cache entries");
            }
        }
    });
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
}
