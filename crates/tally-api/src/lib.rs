//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by any [`tally_core::store::EventStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(state))
//! ```

pub mod error;
pub mod etag;
pub mod registry;
pub mod stats;
pub mod track;
pub mod variant;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tally_core::{store::EventStore, variant::VariantRegistry};

pub use error::ApiError;

/// How the assignment cookie is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookiePolicy {
  /// Add the `Secure` attribute; enable in production.
  pub secure: bool,
}

/// Shared state threaded through all API handlers.
#[derive(Clone)]
pub struct ApiState<S: EventStore> {
  pub store:    Arc<S>,
  pub registry: Arc<VariantRegistry>,
  pub cookie:   CookiePolicy,
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: EventStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Assignment
    .route("/variant", get(variant::handler::<S>))
    // Registry
    .route("/variants", get(registry::list::<S>))
    .route("/content", get(registry::content::<S>))
    // Analytics
    .route("/analytics/track", post(track::handler::<S>))
    .route("/analytics/stats", get(stats::snapshot::<S>))
    .route("/analytics/summary", get(stats::summary::<S>))
    .with_state(state)
}
