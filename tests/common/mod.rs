#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use snaplink::api::handlers::{
    health_handler, list_links_handler, shorten_handler, visit_handler,
};
use snaplink::application::services::LinkService;
use snaplink::domain::repositories::LinkRepository;
use snaplink::infrastructure::cache::{CacheService, NullCache};
use snaplink::infrastructure::persistence::MemoryLinkRepository;
use snaplink::state::AppState;
use snaplink::utils::code_generator::CodeGenerator;

/// Application state over the in-memory store with caching disabled.
pub fn test_state() -> AppState {
    let store: Arc<dyn LinkRepository> = Arc::new(MemoryLinkRepository::new());
    let cache: Arc<dyn CacheService> = Arc::new(NullCache::new());
    let generator = Arc::new(CodeGenerator::with_defaults(2342, 1).unwrap());

    let links = Arc::new(LinkService::new(
        Arc::clone(&store),
        Arc::clone(&cache),
        generator,
        Duration::from_secs(1),
        Duration::from_millis(100),
    ));

    AppState::new(links, store, cache)
}

/// Full route table, minus the outer normalize-path layer the test client
/// does not need.
pub fn test_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_links_handler))
        .route("/health", get(health_handler))
        .route("/short", post(shorten_handler))
        .route("/{code}", post(visit_handler))
        .with_state(state)
}
