//! ETag computation for the stats snapshot.
//!
//! The dashboard polls the snapshot on a fixed interval; a strong ETag lets
//! it skip the body when nothing has been tracked since the last poll.

use axum::http::{HeaderMap, header};
use sha2::{Digest, Sha256};
use tally_core::stats::StatsSnapshot;

/// Compute a quoted ETag over the snapshot's JSON form.
pub fn compute_etag(snapshot: &StatsSnapshot) -> serde_json::Result<String> {
  let bytes = serde_json::to_vec(snapshot)?;
  let hash = Sha256::digest(&bytes);
  Ok(format!("\"{}\"", hex::encode(hash)))
}

/// Whether `If-None-Match` in `headers` matches `etag`.
///
/// Accepts `*`, comma-separated lists, and bare (unquoted) tags, which some
/// clients send.
pub fn if_none_match(headers: &HeaderMap, etag: &str) -> bool {
  let bare = etag.trim_matches('"');
  headers
    .get_all(header::IF_NONE_MATCH)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(','))
    .map(|t| t.trim().trim_start_matches("W/").trim_matches('"'))
    .any(|t| t == "*" || t == bare)
}
