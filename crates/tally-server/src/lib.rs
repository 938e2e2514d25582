//! HTTP server for Tally.
//!
//! Mounts the public [`tally_api`] router under `/api` and the
//! Basic-auth-protected maintenance endpoints under `/admin`.

pub mod admin;
pub mod auth;
pub mod error;

pub use error::Error;

use std::{collections::BTreeMap, num::NonZeroUsize, path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{delete, get, post},
};
use serde::Deserialize;
use tally_api::{ApiState, CookiePolicy};
use tally_core::{
  store::{DEFAULT_MAX_EVENTS, EventStore},
  variant::{VariantId, VariantRegistry},
};
use tower_http::trace::TraceLayer;

use auth::AuthConfig;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TALLY_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  #[serde(default = "default_max_events")]
  pub max_events:          usize,
  #[serde(default)]
  pub secure_cookies:      bool,
  pub admin_username:      String,
  pub admin_password_hash: String,
  /// Per-variant traffic overrides; unnamed variants keep 25.
  #[serde(default)]
  pub weights:             BTreeMap<VariantId, u8>,
}

fn default_max_events() -> usize { DEFAULT_MAX_EVENTS }

impl ServerConfig {
  /// The validated variant registry for these settings.
  pub fn registry(&self) -> tally_core::Result<VariantRegistry> {
    VariantRegistry::with_weights(&self.weights)
  }

  /// Retention bound; `None` when configured as zero.
  pub fn retention(&self) -> Option<NonZeroUsize> {
    NonZeroUsize::new(self.max_events)
  }

  pub fn auth(&self) -> AuthConfig {
    AuthConfig {
      username:      self.admin_username.clone(),
      password_hash: self.admin_password_hash.clone(),
    }
  }

  pub fn cookie_policy(&self) -> CookiePolicy {
    CookiePolicy { secure: self.secure_cookies }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// State for the maintenance handlers. The public API state rides along so
/// both routers share one store.
#[derive(Clone)]
pub struct AppState<S: EventStore> {
  pub api:  ApiState<S>,
  pub auth: Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: EventStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let admin = Router::new()
    .route("/events",    get(admin::events::<S>))
    .route("/recompute", post(admin::recompute::<S>))
    .route("/data",      delete(admin::clear::<S>))
    .with_state(state.clone());

  Router::new()
    .nest("/api", tally_api::api_router(state.api))
    .nest("/admin", admin)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
