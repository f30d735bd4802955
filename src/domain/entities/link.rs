//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A shortened URL with its visit counter.
///
/// Maps a globally unique short code to the original long URL. The long URL
/// is a natural key: at most one Link exists per distinct `long_url`, and a
/// Link is never deleted once created.
///
/// Serde derives exist because cache entries are JSON snapshots of this
/// struct, keyed by `long_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub code: String,
    pub long_url: String,
    /// Monotonically non-decreasing; bumped by exactly 1 per recorded visit.
    pub visits: u64,
    pub created_at: DateTime<Utc>,
}

/// Input data for creating a new link. Visits always start at zero.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub code: String,
    pub long_url: String,
}
