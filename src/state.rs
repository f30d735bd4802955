use std::sync::Arc;

use crate::application::services::LinkService;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;

/// Shared application state injected into every handler.
///
/// The repository and cache handles are constructed once in
/// [`crate::server::run`] and shared by reference counting; nothing in the
/// process reaches for a global connection.
#[derive(Clone)]
pub struct AppState {
    pub links: Arc<LinkService>,
    pub store: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
}

impl AppState {
    pub fn new(
        links: Arc<LinkService>,
        store: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
    ) -> Self {
        Self {
            links,
            store,
            cache,
        }
    }
}
