//! Storage backends implementing the domain repository traits.
//!
//! - [`PgLinkRepository`] - PostgreSQL-backed persistence via SQLx
//! - [`MemoryLinkRepository`] - DashMap-backed store for tests and
//!   database-less deployments

pub mod memory_link_repository;
pub mod pg_link_repository;

pub use memory_link_repository::MemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;
