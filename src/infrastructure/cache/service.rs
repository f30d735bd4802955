//! Cache service trait and error types.

use crate::domain::entities::Link;
use async_trait::async_trait;
use std::fmt;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching link snapshots.
///
/// Entries are JSON-serialized [`Link`] records keyed by long URL, expiring
/// on a fixed TTL. The cache is never authoritative: a stale or missing
/// entry only costs a repository round-trip, so implementations must degrade
/// to a miss rather than disrupt the request.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the cached link snapshot for a long URL.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(link))` on cache hit
    /// - `Ok(None)` on miss, expiry, or corrupt entry (fail-open behavior)
    async fn get(&self, long_url: &str) -> CacheResult<Option<Link>>;

    /// Stores a link snapshot keyed by its long URL.
    ///
    /// # Arguments
    ///
    /// - `link` - The record to snapshot
    /// - `ttl_seconds` - Optional TTL override (implementation default if None)
    ///
    /// # Errors
    ///
    /// Should not propagate errors to callers. Implementations log failures
    /// and return `Ok(())` to keep the request flow intact.
    async fn put(&self, link: &Link, ttl_seconds: Option<u64>) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by the health endpoint to report cache status.
    async fn health_check(&self) -> bool;
}
