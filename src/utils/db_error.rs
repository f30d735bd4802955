use crate::error::{AppError, ConflictKey};

/// Maps a unique-constraint violation to the key it tripped on, by the
/// constraint names declared in `migrations/0001_create_links.sql`.
pub fn conflict_key(e: &sqlx::Error) -> Option<ConflictKey> {
    let db_err = e.as_database_error()?;

    if !db_err.is_unique_violation() {
        return None;
    }

    match db_err.constraint() {
        Some("links_code_key") => Some(ConflictKey::Code),
        Some("links_long_url_key") => Some(ConflictKey::LongUrl),
        _ => None,
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(key) = conflict_key(&e) {
        return AppError::conflict(key);
    }

    if matches!(e, sqlx::Error::PoolTimedOut) {
        return AppError::timeout("timed out acquiring a database connection");
    }

    AppError::internal(format!("database error: {e}"))
}
