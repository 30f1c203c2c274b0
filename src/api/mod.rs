//! API module
//!
//! HTTP API endpoints and middleware.

pub mod middleware;
pub mod routes;

use std::time::Duration;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

use crate::store::Store;
use crate::Config;

pub use routes::create_router;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Store,
    /// Deadline given to each request's transaction context
    pub transfer_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(store: Store, config: &Config) -> Self {
        Self {
            store,
            transfer_timeout: config.transfer_timeout,
        }
    }
}

/// Build the application router: API routes, request context, tracing
pub fn build_router(state: AppState) -> Router {
    let api_router = create_router().layer(axum_middleware::from_fn_with_state(
        state.clone(),
        middleware::request_context_middleware,
    ));

    Router::new()
        // Health check
        .route("/health", axum::routing::get(health_check))
        .merge(api_router)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
