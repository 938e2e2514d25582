//! Handlers for the variant registry.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/variants` | All variants with name, weight, and description |
//! | `GET`  | `/content` | `?locale=en\|fr\|de` and optional `?variant=<id>` |

use axum::{
  Json,
  extract::{Query, State},
  http::HeaderMap,
};
use serde::Deserialize;
use tally_core::{
  content::VariantContent, store::EventStore, variant::Variant,
};

use crate::{
  ApiState,
  variant::{COOKIE_NAME, read_cookie},
};

/// `GET /variants`
pub async fn list<S>(State(state): State<ApiState<S>>) -> Json<Vec<Variant>>
where
  S: EventStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Json(state.registry.variants().to_vec())
}

#[derive(Debug, Deserialize, Default)]
pub struct ContentParams {
  pub locale:  Option<String>,
  /// Defaults to the visitor's assignment cookie, then to control.
  pub variant: Option<String>,
}

/// `GET /content[?locale=...][&variant=...]`
///
/// Never fails: unknown locales fall back to English and unknown variants
/// to the control content.
pub async fn content<S>(
  State(state): State<ApiState<S>>,
  headers: HeaderMap,
  Query(params): Query<ContentParams>,
) -> Json<&'static VariantContent>
where
  S: EventStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let locale = params.locale.as_deref().unwrap_or("en");
  let variant = params
    .variant
    .as_deref()
    .or_else(|| read_cookie(&headers, COOKIE_NAME))
    .unwrap_or("control");
  Json(state.registry.content(locale, variant))
}
