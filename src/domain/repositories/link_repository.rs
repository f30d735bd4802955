//! Repository trait for short link data access.

use crate::domain::entities::{Link, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Authoritative storage interface for short links.
///
/// The repository is the source of truth; the cache layer only mirrors it.
/// Both uniqueness invariants (one record per `code`, one record per
/// `long_url`) are enforced here, atomically, which is what lets concurrent
/// creators race on `insert` without any application-level locking.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - in-memory implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link with a zero visit count.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] when either unique key is already
    /// taken; the embedded [`crate::error::ConflictKey`] says which one.
    /// Exactly one of any set of concurrent inserts for the same `long_url`
    /// succeeds.
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by its original long URL.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found
    /// - `Ok(None)` if not found
    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<Link>, AppError>;

    /// Finds a link by its short code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Atomically bumps the visit counter for `code` by one.
    ///
    /// Implementations must perform the increment as a single storage-level
    /// operation, never a read followed by a write, so that concurrent
    /// visits each land a distinct increment.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` with the post-increment record
    /// - `Ok(None)` if no link exists for `code`
    async fn increment_visit(&self, code: &str) -> Result<Option<Link>, AppError>;

    /// Returns every stored link, in arbitrary order.
    ///
    /// An empty store yields `Ok(vec![])`, never an error.
    async fn list_all(&self) -> Result<Vec<Link>, AppError>;

    /// Counts stored links. Used by the health endpoint as a cheap liveness
    /// probe of the storage backend.
    async fn count(&self) -> Result<i64, AppError>;
}
