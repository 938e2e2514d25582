//! HTTP Basic-auth extractor guarding the maintenance endpoints.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use crate::{AppState, error::Error};
use tally_core::store::EventStore;

/// The single maintenance account, read from `admin_username` and
/// `admin_password_hash`.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2 (`tally-server --hash-password`).
  pub password_hash: String,
}

impl AuthConfig {
  /// Whether `username` / `password` match this account. A hash that does
  /// not parse as PHC rejects every password.
  pub fn verify(&self, username: &str, password: &str) -> bool {
    if username != self.username {
      return false;
    }
    let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
      tracing::error!("admin_password_hash is not a valid PHC string");
      return false;
    };
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok()
  }
}

/// Marker extractor for the `/admin` handlers.
pub struct Authenticated;

/// Decode `Authorization: Basic <b64(user:pass)>`. The password may itself
/// contain `:`.
fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let encoded = headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Basic ")?;
  let decoded = String::from_utf8(B64.decode(encoded.trim()).ok()?).ok()?;
  let (user, pass) = decoded.split_once(':')?;
  Some((user.to_owned(), pass.to_owned()))
}

pub(crate) fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), Error> {
  match basic_credentials(headers) {
    Some((user, pass)) if config.verify(&user, &pass) => Ok(()),
    Some((user, _)) => {
      tracing::warn!(%user, "rejected maintenance credentials");
      Err(Error::Unauthorized)
    }
    None => Err(Error::Unauthorized),
  }
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: EventStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_auth(&parts.headers, &state.auth)?;
    Ok(Authenticated)
  }
}
