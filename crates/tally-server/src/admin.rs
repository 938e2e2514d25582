//! Maintenance endpoints under `/admin`. Every handler requires
//! [`Authenticated`].

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tally_core::{
  event::Event,
  stats::StatsSnapshot,
  store::{EventQuery, EventStore},
};

use crate::{AppState, auth::Authenticated, error::Error};

fn store_err<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}

#[derive(Debug, Default, Deserialize)]
pub struct EventsParams {
  pub variant_id: Option<String>,
  pub from:       Option<DateTime<Utc>>,
  pub to:         Option<DateTime<Utc>>,
}

impl From<EventsParams> for EventQuery {
  fn from(p: EventsParams) -> Self {
    EventQuery { variant_id: p.variant_id, from: p.from, to: p.to }
  }
}

/// `GET /admin/events`: retained events matching the filters, oldest first.
pub async fn events<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
  Query(params): Query<EventsParams>,
) -> Result<Json<Vec<Event>>, Error>
where
  S: EventStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = EventQuery::from(params);
  let events = state.api.store.query(&query).await.map_err(store_err)?;
  Ok(Json(events))
}

/// `POST /admin/recompute`: rebuild the snapshot from the retained log.
pub async fn recompute<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
) -> Result<Json<StatsSnapshot>, Error>
where
  S: EventStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let snapshot = state.api.store.recompute().await.map_err(store_err)?;
  tracing::info!("statistics recomputed");
  Ok(Json(snapshot))
}

/// `DELETE /admin/data`: drop every event and zero the snapshot.
pub async fn clear<S>(
  _auth: Authenticated,
  State(state): State<AppState<S>>,
) -> Result<StatusCode, Error>
where
  S: EventStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state.api.store.clear().await.map_err(store_err)?;
  tracing::warn!("all experiment data cleared");
  Ok(StatusCode::NO_CONTENT)
}
