//! Handler for `GET /variant` and the assignment cookie helpers.
//!
//! The `ab_variant` cookie is the only record of a visitor's assignment; the
//! server keeps no visitor table.

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, header},
  response::{AppendHeaders, IntoResponse, Response},
};
use serde_json::json;
use tally_core::{assign, store::EventStore, variant::VariantId};

use crate::{ApiState, CookiePolicy};

pub const COOKIE_NAME: &str = "ab_variant";

/// Thirty days.
pub const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 30;

/// Find the value of cookie `name` across all `Cookie` headers.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(k, _)| *k == name)
    .map(|(_, v)| v.trim())
}

/// The `Set-Cookie` value persisting `variant` for the visitor.
pub fn assignment_cookie(variant: VariantId, policy: CookiePolicy) -> String {
  let mut cookie = format!(
    "{COOKIE_NAME}={variant}; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}; SameSite=Lax"
  );
  if policy.secure {
    cookie.push_str("; Secure");
  }
  cookie
}

/// `GET /variant`: returns `{"variant": "<id>"}`, setting the cookie on a
/// fresh assignment.
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  headers: HeaderMap,
) -> Response
where
  S: EventStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let token = read_cookie(&headers, COOKIE_NAME);
  let assignment =
    assign::resolve(&state.registry, token, &mut rand::thread_rng());
  let body = Json(json!({ "variant": assignment.variant }));

  if assignment.fresh {
    tracing::debug!(variant = %assignment.variant, "assigned new visitor");
    let cookie = assignment_cookie(assignment.variant, state.cookie);
    (AppendHeaders([(header::SET_COOKIE, cookie)]), body).into_response()
  } else {
    body.into_response()
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn read_cookie_scans_all_headers() {
    let mut headers = HeaderMap::new();
    headers.append(header::COOKIE, HeaderValue::from_static("a=1; b=2"));
    headers.append(header::COOKIE, HeaderValue::from_static("ab_variant=control"));
    assert_eq!(read_cookie(&headers, "b"), Some("2"));
    assert_eq!(read_cookie(&headers, COOKIE_NAME), Some("control"));
    assert_eq!(read_cookie(&headers, "missing"), None);
  }

  #[test]
  fn read_cookie_does_not_match_prefixes() {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_static("xab_variant=variant-a"));
    assert_eq!(read_cookie(&headers, COOKIE_NAME), None);
  }

  #[test]
  fn cookie_attributes() {
    let plain = assignment_cookie(VariantId::VariantB, CookiePolicy::default());
    assert_eq!(
      plain,
      "ab_variant=variant-b; Path=/; Max-Age=2592000; SameSite=Lax"
    );
    let secure = assignment_cookie(VariantId::Control, CookiePolicy { secure: true });
    assert!(secure.ends_with("; Secure"));
  }
}
