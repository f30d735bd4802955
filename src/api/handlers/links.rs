//! Handler for listing every stored link.

use axum::{Json, extract::State};

use crate::api::dto::link::LinkBody;
use crate::error::AppError;
use crate::state::AppState;

/// Lists all stored links.
///
/// # Endpoint
///
/// `GET /`
///
/// # Response
///
/// `200` with a JSON array of `{long, short, visit}` records; an empty store
/// yields `[]`, not an error.
pub async fn list_links_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<LinkBody>>, AppError> {
    let links = state.links.list_all().await?;
    Ok(Json(links.into_iter().map(LinkBody::from).collect()))
}
