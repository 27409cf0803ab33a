//! Caching Proxy - A forwarding HTTP proxy with a shared LRU object cache
//!
//! Usage: `caching_proxy [port]`

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use caching_proxy::api::{create_router, AppState};
use caching_proxy::proxy::{self, ProxyContext};
use caching_proxy::{spawn_stats_reporter, CacheStore, Config};

/// Main entry point for the caching proxy.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables and argv
/// 3. Create the shared cache store
/// 4. Start the background stats reporter
/// 5. Start the admin API on its own port
/// 6. Accept proxy connections until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caching_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Caching Proxy");

    let config = Config::from_env().with_port_arg(std::env::args().nth(1).as_deref());
    info!(
        "Configuration loaded: proxy_port={}, admin_port={}, max_cache_size={}, max_object_size={}, upstream_timeout={}s, stats_interval={}s",
        config.proxy_port,
        config.admin_port,
        config.max_cache_size,
        config.max_object_size,
        config.upstream_timeout,
        config.stats_interval
    );
    if config.object_limit_exceeds_capacity() {
        warn!(
            "MAX_OBJECT_SIZE ({}) exceeds MAX_CACHE_SIZE ({}); such objects will never be cached",
            config.max_object_size, config.max_cache_size
        );
    }

    let cache = Arc::new(CacheStore::new(config.max_cache_size));
    info!("Cache store initialized");

    let mut background: Vec<JoinHandle<()>> = Vec::new();

    if config.stats_interval > 0 {
        background.push(spawn_stats_reporter(cache.clone(), config.stats_interval));
        info!("Background stats reporter started");
    }

    if config.admin_port != 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.admin_port));
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind admin API on {addr}"))?;
        info!("Admin API listening on http://{}", addr);

        let app = create_router(AppState::new(cache.clone()));
        background.push(tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                warn!(error = %err, "admin API stopped");
            }
        }));
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.proxy_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind proxy on {addr}"))?;
    info!("Proxy listening on {}", addr);

    let ctx = ProxyContext::from_config(cache, &config);
    proxy::serve(listener, ctx, shutdown_signal()).await;

    for handle in background {
        handle.abort();
    }
    warn!("Background tasks aborted");

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to install SIGTERM handler");
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
