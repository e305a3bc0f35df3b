//! HTTP API over the planet catalog.
//!
//! `routes::build_router` is the single entry point; `serve` attaches the
//! tracing layer and runs it until Ctrl+C. Tests drive the bare router.

mod response;
pub mod routes;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use crate::error::{CatalogError, CatalogResult};
use crate::store::Store;

/// Shared state handed to every handler
pub struct AppState {
    store: Mutex<Store>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Run one store operation under the lock on the blocking thread pool.
    ///
    /// SQLite calls can wait up to the busy timeout, so they never run on an
    /// async worker.
    pub async fn with_store<T, F>(self: &Arc<Self>, op: F) -> CatalogResult<T>
    where
        F: FnOnce(&mut Store) -> CatalogResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let state = Arc::clone(self);
        match tokio::task::spawn_blocking(move || state.run_locked(op)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(err),
            Err(e) => Err(CatalogError::Internal(format!("store worker join error: {}", e))),
        }
    }

    fn run_locked<T>(&self, op: impl FnOnce(&mut Store) -> CatalogResult<T>) -> CatalogResult<T> {
        let mut store = self
            .store
            .lock()
            .map_err(|e| CatalogError::Internal(format!("store lock poisoned: {}", e)))?;
        op(&mut store)
    }
}

/// Serve the API on `addr` until the process is interrupted
pub async fn serve(store: Store, addr: SocketAddr) -> Result<()> {
    let state = Arc::new(AppState::new(store));

    let app = routes::build_router(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Serving planets at http://{}/planets", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
