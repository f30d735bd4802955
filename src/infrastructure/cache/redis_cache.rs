//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::Link;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

/// Redis cache for link snapshots.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection
/// reuse. All operations are fail-open: errors are logged but don't
/// propagate to callers.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis, validates the connection with a PING, and
    /// configures the default TTL.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `default_ttl_seconds` - TTL applied when [`CacheService::put`] is
    ///   called with `ttl_seconds = None`; controlled via `CACHE_TTL_SECONDS`
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
            key_prefix: "link:".to_string(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, long_url: &str) -> String {
        format!("{}{}", self.key_prefix, long_url)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get(&self, long_url: &str) -> CacheResult<Option<Link>> {
        let key = self.build_key(long_url);
        let mut conn = self.client.clone();

        let payload = match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("Cache MISS: {}", long_url);
                return Ok(None);
            }
            Err(e) => {
                warn!("Redis GET error for {}: {}", long_url, e);
                return Ok(None);
            }
        };

        match serde_json::from_str::<Link>(&payload) {
            Ok(link) => {
                debug!("Cache HIT: {} -> {}", long_url, link.code);
                Ok(Some(link))
            }
            Err(e) => {
                // Corrupt entry; treat as a miss so the store gets consulted.
                warn!("Discarding undecodable cache entry for {}: {}", long_url, e);
                Ok(None)
            }
        }
    }

    async fn put(&self, link: &Link, ttl_seconds: Option<u64>) -> CacheResult<()> {
        let key = self.build_key(&link.long_url);
        let mut conn = self.client.clone();
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);

        let payload = match serde_json::to_string(link) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize cache entry for {}: {}", link.long_url, e);
                return Ok(());
            }
        };

        match conn.set_ex::<_, _, ()>(&key, payload, ttl).await {
            Ok(_) => {
                debug!("Cache SET: {} -> {} (TTL: {}s)", link.long_url, link.code, ttl);
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", link.long_url, e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
