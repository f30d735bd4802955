//! Link resolution and visit tracking service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, ConflictKey};
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::CodeGenerator;

/// Collision budget for freshly generated codes. A collision means the
/// generator drew an already-taken code, which at 64^9 possible codes
/// resolves within one retry in practice.
const MAX_CODE_ATTEMPTS: usize = 10;

/// Client-facing message for visits against an unknown code.
const UNKNOWN_CODE_MESSAGE: &str = "Please provide valid shortened url";

/// Orchestrates the repository, the cache, and the code generator to
/// implement the two request shapes: create-or-resolve for a long URL, and
/// visit-and-count for a short code.
///
/// # Consistency model
///
/// The repository is authoritative; the cache is a best-effort mirror keyed
/// by long URL. The create path reads the cache first (a hit may carry a
/// stale visit count, which is acceptable), the visit path never reads it
/// and only refreshes it after the counter moved. Creation races are settled
/// by the repository's atomic insert: the loser observes a long-URL conflict
/// and adopts the winner's record, so concurrent creators always converge on
/// one code per URL.
///
/// # Deadlines
///
/// Every repository call runs under `store_timeout`; elapsing it fails the
/// request with [`AppError::Timeout`]. Every cache call runs under
/// `cache_timeout`; elapsing it (or any cache error) degrades to a miss and
/// never fails the request.
pub struct LinkService {
    store: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    generator: Arc<CodeGenerator>,
    store_timeout: Duration,
    cache_timeout: Duration,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(
        store: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        generator: Arc<CodeGenerator>,
        store_timeout: Duration,
        cache_timeout: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            generator,
            store_timeout,
            cache_timeout,
        }
    }

    /// Resolves a long URL to its link, creating one if none exists.
    ///
    /// Creation is idempotent: repeated calls for the same URL return the
    /// same code, including under concurrent callers racing on first
    /// creation.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when `long_url` is empty,
    /// [`AppError::Timeout`] when a repository call exceeds its deadline,
    /// and [`AppError::Internal`] when the collision budget is exhausted.
    pub async fn resolve_or_create(&self, long_url: &str) -> Result<Link, AppError> {
        let long_url = long_url.trim();
        if long_url.is_empty() {
            return Err(AppError::bad_request("Please provide a url to shorten"));
        }

        if let Some(link) = self.cache_get(long_url).await {
            counter!("snaplink_cache_hits_total").increment(1);
            return Ok(link);
        }
        counter!("snaplink_cache_misses_total").increment(1);

        if let Some(link) = self
            .store_op("lookup", self.store.find_by_long_url(long_url))
            .await?
        {
            self.cache_put(&link).await;
            return Ok(link);
        }

        self.create(long_url).await
    }

    /// Records a visit against a short code and returns the updated link.
    ///
    /// The counter moves by exactly one per successful call, enforced by the
    /// repository's atomic increment. The cache entry for the link's long
    /// URL is refreshed afterwards so subsequent create-or-resolve hits see
    /// a recent count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when no link exists for `code`.
    pub async fn visit(&self, code: &str) -> Result<Link, AppError> {
        let link = self
            .store_op("visit increment", self.store.increment_visit(code))
            .await?
            .ok_or_else(|| AppError::not_found(UNKNOWN_CODE_MESSAGE))?;

        counter!("snaplink_visits_total").increment(1);
        self.cache_put(&link).await;
        Ok(link)
    }

    /// Returns every stored link. An empty store is a valid, empty result.
    pub async fn list_all(&self) -> Result<Vec<Link>, AppError> {
        self.store_op("listing", self.store.list_all()).await
    }

    /// Inserts a new link under a freshly generated code, retrying on code
    /// collisions and adopting the winner's record when a concurrent
    /// creator registered the URL first.
    async fn create(&self, long_url: &str) -> Result<Link, AppError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = self
                .generator
                .generate()
                .map_err(|e| AppError::internal(format!("code generation failed: {e}")))?;

            let new_link = NewLink {
                code,
                long_url: long_url.to_string(),
            };

            match self.store_op("insert", self.store.insert(new_link)).await {
                Ok(link) => {
                    counter!("snaplink_links_created_total").increment(1);
                    debug!("Created {} -> {}", link.code, link.long_url);
                    self.cache_put(&link).await;
                    return Ok(link);
                }
                Err(AppError::Conflict {
                    key: ConflictKey::LongUrl,
                }) => {
                    // A concurrent creator won the race; their record is the
                    // one true mapping for this URL.
                    let link = self
                        .store_op("post-race lookup", self.store.find_by_long_url(long_url))
                        .await?
                        .ok_or_else(|| {
                            AppError::internal("link vanished after duplicate long URL")
                        })?;
                    self.cache_put(&link).await;
                    return Ok(link);
                }
                Err(AppError::Conflict {
                    key: ConflictKey::Code,
                }) => {
                    debug!("Generated code already taken, retrying");
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "failed to allocate a unique short code: too many collisions",
        ))
    }

    /// Runs a repository call under the store deadline.
    async fn store_op<T>(
        &self,
        what: &str,
        op: impl Future<Output = Result<T, AppError>> + Send,
    ) -> Result<T, AppError> {
        match timeout(self.store_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(AppError::timeout(format!("store {what} timed out"))),
        }
    }

    /// Cache read under the cache deadline. Timeouts and errors are misses.
    async fn cache_get(&self, long_url: &str) -> Option<Link> {
        match timeout(self.cache_timeout, self.cache.get(long_url)).await {
            Ok(Ok(hit)) => hit,
            Ok(Err(e)) => {
                warn!("Cache read failed for {}: {}", long_url, e);
                None
            }
            Err(_) => {
                warn!("Cache read timed out for {}", long_url);
                None
            }
        }
    }

    /// Cache write under the cache deadline. Failures are logged, never
    /// surfaced.
    async fn cache_put(&self, link: &Link) {
        match timeout(self.cache_timeout, self.cache.put(link, None)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Cache write failed for {}: {}", link.long_url, e),
            Err(_) => warn!("Cache write timed out for {}", link.long_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::{CacheError, CacheResult, MockCacheService, NullCache};
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::Sequence;

    fn test_link(code: &str, url: &str, visits: u64) -> Link {
        Link {
            code: code.to_string(),
            long_url: url.to_string(),
            visits,
            created_at: Utc::now(),
        }
    }

    fn test_generator() -> Arc<CodeGenerator> {
        Arc::new(CodeGenerator::with_defaults(2342, 1).unwrap())
    }

    fn service_with(
        store: MockLinkRepository,
        cache: impl CacheService + 'static,
    ) -> LinkService {
        LinkService::new(
            Arc::new(store),
            Arc::new(cache),
            test_generator(),
            Duration::from_secs(1),
            Duration::from_millis(100),
        )
    }

    #[tokio::test]
    async fn test_resolve_or_create_creates_when_unseen() {
        let mut store = MockLinkRepository::new();

        store
            .expect_find_by_long_url()
            .times(1)
            .returning(|_| Ok(None));

        store
            .expect_insert()
            .withf(|new_link| new_link.code.len() == 9 && new_link.long_url == "https://example.com")
            .times(1)
            .returning(|new_link| {
                Ok(Link {
                    code: new_link.code,
                    long_url: new_link.long_url,
                    visits: 0,
                    created_at: Utc::now(),
                })
            });

        let service = service_with(store, NullCache::new());

        let link = service
            .resolve_or_create("https://example.com")
            .await
            .unwrap();
        assert_eq!(link.long_url, "https://example.com");
        assert_eq!(link.visits, 0);
    }

    #[tokio::test]
    async fn test_resolve_or_create_is_idempotent_for_known_urls() {
        let mut store = MockLinkRepository::new();

        let existing = test_link("existing1", "https://example.com", 7);
        store
            .expect_find_by_long_url()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        store.expect_insert().times(0);

        let service = service_with(store, NullCache::new());

        let link = service
            .resolve_or_create("https://example.com")
            .await
            .unwrap();
        assert_eq!(link.code, "existing1");
    }

    #[tokio::test]
    async fn test_resolve_or_create_cache_hit_skips_the_store() {
        let mut store = MockLinkRepository::new();
        store.expect_find_by_long_url().times(0);
        store.expect_insert().times(0);

        let mut cache = MockCacheService::new();
        let cached = test_link("cached1234", "https://example.com", 3);
        cache
            .expect_get()
            .times(1)
            .returning(move |_| Ok(Some(cached.clone())));
        cache.expect_put().times(0);

        let service = service_with(store, cache);

        let link = service
            .resolve_or_create("https://example.com")
            .await
            .unwrap();
        assert_eq!(link.code, "cached1234");
    }

    #[tokio::test]
    async fn test_resolve_or_create_adopts_winner_after_lost_race() {
        let mut store = MockLinkRepository::new();
        let mut seq = Sequence::new();

        store
            .expect_find_by_long_url()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));

        store
            .expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict(ConflictKey::LongUrl)));

        let winner = test_link("winner123", "https://example.com", 0);
        store
            .expect_find_by_long_url()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(winner.clone())));

        let service = service_with(store, NullCache::new());

        let link = service
            .resolve_or_create("https://example.com")
            .await
            .unwrap();
        assert_eq!(link.code, "winner123");
    }

    #[tokio::test]
    async fn test_resolve_or_create_retries_on_code_collision() {
        let mut store = MockLinkRepository::new();
        let mut seq = Sequence::new();

        store
            .expect_find_by_long_url()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));

        store
            .expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict(ConflictKey::Code)));

        store
            .expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new_link| {
                Ok(Link {
                    code: new_link.code,
                    long_url: new_link.long_url,
                    visits: 0,
                    created_at: Utc::now(),
                })
            });

        let service = service_with(store, NullCache::new());

        let link = service
            .resolve_or_create("https://example.com")
            .await
            .unwrap();
        assert_eq!(link.long_url, "https://example.com");
    }

    #[tokio::test]
    async fn test_resolve_or_create_gives_up_after_collision_budget() {
        let mut store = MockLinkRepository::new();

        store
            .expect_find_by_long_url()
            .times(1)
            .returning(|_| Ok(None));

        store
            .expect_insert()
            .times(MAX_CODE_ATTEMPTS)
            .returning(|_| Err(AppError::conflict(ConflictKey::Code)));

        let service = service_with(store, NullCache::new());

        let result = service.resolve_or_create("https://example.com").await;
        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_resolve_or_create_rejects_empty_url() {
        let store = MockLinkRepository::new();
        let service = service_with(store, NullCache::new());

        let result = service.resolve_or_create("   ").await;
        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_resolve_or_create_degrades_to_store_on_cache_error() {
        let mut store = MockLinkRepository::new();
        let existing = test_link("existing1", "https://example.com", 2);
        store
            .expect_find_by_long_url()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        let mut cache = MockCacheService::new();
        cache
            .expect_get()
            .times(1)
            .returning(|_| Err(CacheError::OperationError("boom".to_string())));
        cache.expect_put().times(1).returning(|_, _| Ok(()));

        let service = service_with(store, cache);

        let link = service
            .resolve_or_create("https://example.com")
            .await
            .unwrap();
        assert_eq!(link.code, "existing1");
    }

    #[tokio::test]
    async fn test_visit_increments_and_refreshes_cache() {
        let mut store = MockLinkRepository::new();
        let updated = test_link("abc123", "https://example.com", 6);
        store
            .expect_increment_visit()
            .withf(|code| code == "abc123")
            .times(1)
            .returning(move |_| Ok(Some(updated.clone())));

        let mut cache = MockCacheService::new();
        cache
            .expect_put()
            .withf(|link, _| link.long_url == "https://example.com" && link.visits == 6)
            .times(1)
            .returning(|_, _| Ok(()));

        let service = service_with(store, cache);

        let link = service.visit("abc123").await.unwrap();
        assert_eq!(link.visits, 6);
    }

    #[tokio::test]
    async fn test_visit_unknown_code_is_a_client_error() {
        let mut store = MockLinkRepository::new();
        store
            .expect_increment_visit()
            .times(1)
            .returning(|_| Ok(None));

        let mut cache = MockCacheService::new();
        cache.expect_put().times(0);

        let service = service_with(store, cache);

        let err = service.visit("doesNotExist").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.to_string(), "Please provide valid shortened url");
    }

    #[tokio::test]
    async fn test_list_all_passes_through_the_empty_store() {
        let mut store = MockLinkRepository::new();
        store.expect_list_all().times(1).returning(|| Ok(vec![]));

        let service = service_with(store, NullCache::new());

        let links = service.list_all().await.unwrap();
        assert!(links.is_empty());
    }

    /// Repository stub whose every operation outlasts any reasonable
    /// deadline.
    struct SlowStore;

    #[async_trait]
    impl LinkRepository for SlowStore {
        async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(test_link(&new_link.code, &new_link.long_url, 0))
        }
        async fn find_by_long_url(&self, _long_url: &str) -> Result<Option<Link>, AppError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(None)
        }
        async fn find_by_code(&self, _code: &str) -> Result<Option<Link>, AppError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(None)
        }
        async fn increment_visit(&self, _code: &str) -> Result<Option<Link>, AppError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(None)
        }
        async fn list_all(&self) -> Result<Vec<Link>, AppError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(vec![])
        }
        async fn count(&self) -> Result<i64, AppError> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(0)
        }
    }

    /// Cache stub that never answers within the deadline.
    struct SlowCache;

    #[async_trait]
    impl CacheService for SlowCache {
        async fn get(&self, _long_url: &str) -> CacheResult<Option<Link>> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(None)
        }
        async fn put(&self, _link: &Link, _ttl_seconds: Option<u64>) -> CacheResult<()> {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        }
        async fn health_check(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_store_deadline_fails_the_request() {
        let service = LinkService::new(
            Arc::new(SlowStore),
            Arc::new(NullCache::new()),
            test_generator(),
            Duration::from_millis(10),
            Duration::from_millis(10),
        );

        let err = service
            .resolve_or_create("https://example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_cache_deadline_degrades_to_a_miss() {
        let mut store = MockLinkRepository::new();
        let existing = test_link("existing1", "https://example.com", 0);
        store
            .expect_find_by_long_url()
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        let service = LinkService::new(
            Arc::new(store),
            Arc::new(SlowCache),
            test_generator(),
            Duration::from_secs(1),
            Duration::from_millis(10),
        );

        let link = service
            .resolve_or_create("https://example.com")
            .await
            .unwrap();
        assert_eq!(link.code, "existing1");
    }
}
