//! HTTP server for helpdeskd

use crate::desk::Desk;
use crate::routes;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    /// Queries take the read lock; every lifecycle operation takes the
    /// write lock, so mutations are applied one at a time.
    pub desk: Arc<RwLock<Desk>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(desk: Desk) -> Self {
        Self {
            desk: Arc::new(RwLock::new(desk)),
            start_time: Instant::now(),
        }
    }
}

/// Build the router with all route groups
pub fn app(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .merge(routes::health_routes())
        .merge(routes::user_routes())
        .merge(routes::ticket_routes())
        .merge(routes::work_order_routes())
        .merge(routes::notification_routes())
        .merge(routes::zoom_routes())
        .merge(routes::inventory_routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until ctrl-c
pub async fn run(state: AppState, addr: &str) -> Result<()> {
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down gracefully");
        })
        .await?;
    Ok(())
}
