use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use tracing::instrument;

use crate::{error::ApiError, state::AppState, visitors::VisitorInfo};

pub fn routes() -> Router<AppState> {
    Router::new().route("/visitors", get(track))
}

/// Record the caller and echo what was captured.
#[instrument(skip(state, headers))]
pub async fn track(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<VisitorInfo>, ApiError> {
    let visitor = VisitorInfo::from_headers(&headers);
    super::repo::record(&state.db, &visitor).await?;
    Ok(Json(visitor))
}
