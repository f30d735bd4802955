//! Wire representation of a link.

use crate::domain::entities::Link;
use serde::Serialize;

/// JSON body for a link: `{long, short, visit}`.
#[derive(Debug, Serialize)]
pub struct LinkBody {
    pub long: String,
    pub short: String,
    pub visit: u64,
}

impl From<Link> for LinkBody {
    fn from(link: Link) -> Self {
        Self {
            long: link.long_url,
            short: link.code,
            visit: link.visits,
        }
    }
}
