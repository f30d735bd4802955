//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /`        - List every stored link
//! - `GET  /health`  - Health check: storage and cache
//! - `POST /short`   - Create or resolve a short link (form field `url`)
//! - `POST /{code}`  - Record a visit and return the updated link
//!
//! The static `/short` and `/health` segments win over the `/{code}`
//! capture, so those path values can never be visited as codes; generated
//! codes are longer than either word.
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{health_handler, list_links_handler, shorten_handler, visit_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .route("/", get(list_links_handler))
        .route("/health", get(health_handler))
        .route("/short", post(shorten_handler))
        .route("/{code}", post(visit_handler))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
