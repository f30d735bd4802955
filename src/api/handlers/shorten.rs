//! Handler for the shorten endpoint.

use axum::{Form, Json, extract::State};
use validator::Validate;

use crate::api::dto::link::LinkBody;
use crate::api::dto::shorten::ShortenForm;
use crate::error::AppError;
use crate::state::AppState;

/// Resolves a long URL to its short link, creating one on first sight.
///
/// # Endpoint
///
/// `POST /short` with form field `url`
///
/// # Response
///
/// Always `200` on a valid URL. A repeated URL returns its existing link,
/// whose visit count may lag the store when served from cache:
///
/// ```json
/// {"long": "https://example.com", "short": "fq2LgDmR-", "visit": 0}
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request when the `url` field is missing or empty.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Form(form): Form<ShortenForm>,
) -> Result<Json<LinkBody>, AppError> {
    form.validate()?;

    let link = state.links.resolve_or_create(&form.url).await?;
    Ok(Json(link.into()))
}
