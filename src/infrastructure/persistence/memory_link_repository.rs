//! In-memory implementation of link repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, mapref::entry::Entry};

use crate::domain::entities::{Link, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, ConflictKey};

/// In-memory repository backed by DashMap.
///
/// Serves two roles: the storage backend for deployments without a
/// `DATABASE_URL`, and the store integration tests run against. DashMap's
/// sharded locks give the same per-key atomicity the PostgreSQL backend
/// gets from its constraints and single-statement update: `entry` holds the
/// shard exclusively during insert, and `get_mut` during the counter bump.
///
/// Two maps are kept: `by_code` owns the records, `by_long` is the
/// long-URL index. Insert publishes the record before the index entry and
/// always locks the long-URL shard before the code shard, as does the
/// index lookup.
#[derive(Debug, Default)]
pub struct MemoryLinkRepository {
    by_code: DashMap<String, Link>,
    by_long: DashMap<String, String>,
}

impl MemoryLinkRepository {
    /// Creates an empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<Link, AppError> {
        let NewLink { code, long_url } = new_link;

        match self.by_long.entry(long_url.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(ConflictKey::LongUrl)),
            Entry::Vacant(long_slot) => match self.by_code.entry(code.clone()) {
                Entry::Occupied(_) => Err(AppError::conflict(ConflictKey::Code)),
                Entry::Vacant(code_slot) => {
                    let link = Link {
                        code: code.clone(),
                        long_url,
                        visits: 0,
                        created_at: Utc::now(),
                    };
                    code_slot.insert(link.clone());
                    long_slot.insert(code);
                    Ok(link)
                }
            },
        }
    }

    async fn find_by_long_url(&self, long_url: &str) -> Result<Option<Link>, AppError> {
        let Some(code) = self.by_long.get(long_url).map(|c| c.value().clone()) else {
            return Ok(None);
        };

        Ok(self.by_code.get(&code).map(|l| l.value().clone()))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        Ok(self.by_code.get(code).map(|l| l.value().clone()))
    }

    async fn increment_visit(&self, code: &str) -> Result<Option<Link>, AppError> {
        match self.by_code.get_mut(code) {
            Some(mut link) => {
                link.visits += 1;
                Ok(Some(link.value().clone()))
            }
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<Link>, AppError> {
        Ok(self.by_code.iter().map(|l| l.value().clone()).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.by_code.len() as i64)
    }
}
