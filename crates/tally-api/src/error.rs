//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  /// A storage failure. `context` is the message shown to the client; the
  /// underlying error is only logged.
  #[error("{context}: {source}")]
  Store {
    context: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl ApiError {
  /// Adapter for `map_err` that wraps a store error with a client-facing
  /// message.
  pub fn store<E>(context: &'static str) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| ApiError::Store { context, source: Box::new(e) }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store { context, source } => {
        tracing::error!(error = %source, "{context}");
        (StatusCode::INTERNAL_SERVER_ERROR, (*context).to_owned())
      }
      ApiError::Serialization(e) => {
        tracing::error!(error = %e, "failed to serialise response");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
