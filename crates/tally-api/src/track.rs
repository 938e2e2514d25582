//! Handler for `POST /analytics/track`.
//!
//! Body: `{"variantId": "...", "eventType": "...", "locale"?: "...",
//! "metadata"?: {...}}`. The receipt time, user agent, and referrer are taken
//! from the request, never from the body.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::{HeaderMap, header},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::{
  event::{EventType, Metadata, NewEvent},
  store::EventStore,
};

use crate::{ApiState, error::ApiError};

/// JSON body accepted by `POST /analytics/track`. Required fields are
/// optional here so that their absence maps to a 400 rather than a
/// deserialisation rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackBody {
  pub variant_id: Option<String>,
  pub event_type: Option<String>,
  pub locale:     Option<String>,
  pub metadata:   Option<Metadata>,
}

impl TrackBody {
  /// Validate and convert into a [`NewEvent`], attaching request headers.
  pub fn into_new_event(self, headers: &HeaderMap) -> Result<NewEvent, ApiError> {
    let (Some(variant_id), Some(event_type)) = (
      self.variant_id.filter(|s| !s.is_empty()),
      self.event_type.filter(|s| !s.is_empty()),
    ) else {
      return Err(ApiError::BadRequest("Missing required fields".into()));
    };
    let event_type = EventType::parse(&event_type)
      .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let header_str = |name| {
      headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
    };

    Ok(NewEvent {
      variant_id,
      event_type,
      locale: self.locale.filter(|s| !s.is_empty()).unwrap_or_else(|| "en".into()),
      timestamp: None,
      metadata: self.metadata,
      user_agent: header_str(header::USER_AGENT),
      referrer: header_str(header::REFERER),
    })
  }
}

/// `POST /analytics/track`: returns `{"success": true}`.
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  headers: HeaderMap,
  body: Result<Json<TrackBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: EventStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let input = body.into_new_event(&headers)?;

  let event = state
    .store
    .append(input)
    .await
    .map_err(ApiError::store("Failed to track event"))?;
  tracing::debug!(
    variant = %event.variant_id,
    event_type = %event.event_type,
    "tracked event"
  );

  Ok(Json(json!({ "success": true })))
}
