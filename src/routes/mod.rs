//! Router Module Index
//!
//! One router per resource plus the unauthenticated health probe. Both resource
//! routers are wrapped by the authorization gate in `create_router`.

use crate::AppState;
use axum::{Router, routing::get};

/// `/api/authors` endpoints.
pub mod authors;

/// `/api/articles` endpoints.
pub mod posts;

/// Every resource route, ready for the authorization gate.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(authors::author_routes())
        .merge(posts::post_routes())
}

/// GET /health
/// Liveness check for load balancers. Never gated.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(|| async { "ok" }))
}
