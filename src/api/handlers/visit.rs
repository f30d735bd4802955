//! Handler for recording a visit against a short code.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::link::LinkBody;
use crate::error::AppError;
use crate::state::AppState;

/// Records one visit for a short code and returns the updated link.
///
/// # Endpoint
///
/// `POST /{code}`
///
/// # Response
///
/// `200` with the post-increment record; concurrent callers each observe a
/// distinct count because the increment is atomic at the storage layer.
///
/// # Errors
///
/// Returns `400 {"message": "Please provide valid shortened url"}` when the
/// code is unknown.
pub async fn visit_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkBody>, AppError> {
    let link = state.links.visit(&code).await?;
    Ok(Json(link.into()))
}
