//! DTO for the shorten endpoint.

use serde::Deserialize;
use validator::Validate;

/// Form payload for `POST /short`.
///
/// A missing `url` field deserializes to the empty string so that both
/// "absent" and "empty" fail the same length validation.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: String,
}
