//! Cachegate - a thin HTTP backend with a store-backed caching layer
//!
//! Serves a small API surface behind a Redis-backed response cache and
//! per-scope rate limiting, degrading to in-process storage when Redis is
//! unreachable.

use std::net::SocketAddr;

use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cachegate::api::create_router;
use cachegate::{spawn_sweep_task, AppState, CacheStore, Config};

/// Main entry point.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the cache store, falling back to in-process storage
/// 4. Start the expiry sweep task when the fallback is active
/// 5. Create the Axum router with all endpoints
/// 6. Start the HTTP server on the configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cachegate=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cachegate");

    let config = Config::from_env();
    info!(
        port = config.server_port,
        redis_host = %config.redis_host,
        redis_port = config.redis_port,
        environment = %config.environment,
        "configuration loaded"
    );

    // Cache store unavailability is non-fatal: degrade to in-process storage
    let store = match CacheStore::connect(&config).await {
        Ok(store) => {
            info!("cache store connected");
            store
        }
        Err(err) => {
            warn!(%err, "cache store unreachable, falling back to in-process storage");
            CacheStore::in_memory()
        }
    };

    // The remote backend expires keys natively; only the fallback needs a sweep
    let sweep_handle = store
        .is_fallback()
        .then(|| spawn_sweep_task(store.clone(), config.cleanup_interval));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let state = AppState::new(store, config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(sweep_handle))
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Sweep task aborted");
    }
}
