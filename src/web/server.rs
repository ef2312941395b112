//! HTTP server implementation

use axum::{
    routing::{get, MethodRouter},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::{delete_key, delete_root, get_key, get_root, set_key, AppState};
use crate::config::CacheConfig;
use crate::partition::Partitioner;
use crate::store::{self, CacheStore};

/// Build the application router
pub fn router(state: AppState) -> Router {
    let root: MethodRouter<AppState> = get(get_root)
        .post(set_key)
        .put(set_key)
        .delete(delete_root);

    let keyed: MethodRouter<AppState> = get(get_key)
        .post(set_key)
        .put(set_key)
        .delete(delete_key);

    Router::new()
        .route("/", root)
        .route("/*key", keyed)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the server described by `config` until a shutdown signal arrives
pub async fn run(config: CacheConfig) -> anyhow::Result<()> {
    config.validate()?;

    let store = store::build(config.store, config.capacity, config.stripes);
    let partitioner = Partitioner::new(config.nodes)?;
    info!(
        "Store: {:?}, capacity {}, partitioned over {} nodes",
        config.store, config.capacity, config.nodes
    );

    let listener = TcpListener::bind(config.bind).await?;
    run_with_state(listener, AppState::new(store, partitioner), shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn run_with_state(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let store = Arc::clone(&state.store);
    let app = router(state);

    info!("Cache available at http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    let stats = store.stats();
    info!(
        "Server stopped with {} of {} entries ({} bytes)",
        stats.keys, stats.capacity, stats.used_memory_bytes
    );
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
