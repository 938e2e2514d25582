//! Handlers for the aggregated statistics.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/analytics/stats` | Full snapshot keyed by variant id; honours `If-None-Match` |
//! | `GET`  | `/analytics/summary` | Totals, average conversion rate, current winner |
//!
//! Both read the persisted snapshot and never recompute it.

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use tally_core::{stats::Summary, store::EventStore};

use crate::{
  ApiState,
  error::ApiError,
  etag::{compute_etag, if_none_match},
};

/// `GET /analytics/stats`
pub async fn snapshot<S>(
  State(state): State<ApiState<S>>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: EventStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let stats = state
    .store
    .current_stats()
    .await
    .map_err(ApiError::store("Failed to fetch stats"))?;

  let etag = compute_etag(&stats)?;
  if if_none_match(&headers, &etag) {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }
  Ok(([(header::ETAG, etag)], Json(stats)).into_response())
}

/// `GET /analytics/summary`
pub async fn summary<S>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Summary>, ApiError>
where
  S: EventStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let stats = state
    .store
    .current_stats()
    .await
    .map_err(ApiError::store("Failed to fetch stats"))?;
  Ok(Json(stats.summary()))
}
