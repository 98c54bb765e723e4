//! Tiered Cache - a two-level read-through cache
//!
//! Hosts the cache service and exposes it over HTTP with stats and health
//! diagnostics.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiered_cache::api::create_router;
use tiered_cache::service::FileWarmupSource;
use tiered_cache::{spawn_cleanup_task, spawn_event_logger, AppState, CacheService, Config};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache service (L2 connects in the background)
/// 4. Start the L1 sweep and event logger
/// 5. Warm the cache in the background if a warmup file is configured
/// 6. Serve the HTTP API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiered_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tiered cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: l1={:?}, l2={:?}, remote={:?}, port={}, cleanup_interval={}s",
        config.tiers.l1, config.tiers.l2, config.remote, config.server_port, config.cleanup_interval
    );

    let cache = CacheService::from_config(&config).context("creating cache service")?;

    let (cleanup_handle, events_handle) = {
        let memory = cache.memory();
        let events = memory.read().await.subscribe();
        (
            spawn_cleanup_task(memory, config.cleanup_interval),
            spawn_event_logger(events),
        )
    };

    if let Some(path) = config.warmup_file.clone() {
        let cache = cache.clone();
        tokio::spawn(async move {
            match FileWarmupSource::open(&path).await {
                Ok(source) => {
                    cache.warmup(&source).await;
                }
                Err(e) => warn!("Cache warmup skipped: {:#}", e),
            }
        });
    }

    let app = create_router(AppState::new(cache));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    cleanup_handle.abort();
    events_handle.abort();
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
