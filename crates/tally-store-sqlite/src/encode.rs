//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (UTC, microsecond
//! precision, `Z` suffix) so that string order equals chronological order.
//! Metadata is stored as compact JSON. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use tally_core::{
  event::{Event, EventType, Metadata},
  stats::VariantStats,
  variant::VariantId,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

/// Drop sub-microsecond precision so a value survives a round trip through
/// [`encode_dt`] unchanged.
pub fn storable_dt(dt: DateTime<Utc>) -> DateTime<Utc> { dt.trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Metadata ────────────────────────────────────────────────────────────────

pub fn encode_metadata(m: &Metadata) -> Result<String> {
  Ok(serde_json::to_string(m)?)
}

pub fn decode_metadata(s: &str) -> Result<Metadata> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `events` row.
pub struct RawEvent {
  pub event_id:   String,
  pub variant_id: String,
  pub event_type: String,
  pub locale:     String,
  pub timestamp:  String,
  pub metadata:   Option<String>,
  pub user_agent: Option<String>,
  pub referrer:   Option<String>,
}

impl RawEvent {
  pub const COLUMNS: &'static str = "event_id, variant_id, event_type, locale, \
                                     timestamp, metadata, user_agent, referrer";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:   row.get(0)?,
      variant_id: row.get(1)?,
      event_type: row.get(2)?,
      locale:     row.get(3)?,
      timestamp:  row.get(4)?,
      metadata:   row.get(5)?,
      user_agent: row.get(6)?,
      referrer:   row.get(7)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      id:         decode_uuid(&self.event_id)?,
      variant_id: self.variant_id,
      event_type: EventType::parse(&self.event_type)?,
      locale:     self.locale,
      timestamp:  decode_dt(&self.timestamp)?,
      metadata:   self.metadata.as_deref().map(decode_metadata).transpose()?,
      user_agent: self.user_agent,
      referrer:   self.referrer,
    })
  }
}

/// Raw values read directly from a `variant_stats` row.
pub struct RawStats {
  pub variant_id:      String,
  pub page_views:      i64,
  pub cta_clicks:      i64,
  pub form_submits:    i64,
  pub phone_clicks:    i64,
  pub conversion_rate: f64,
  pub last_updated:    String,
}

impl RawStats {
  pub const COLUMNS: &'static str = "variant_id, page_views, cta_clicks, \
                                     form_submits, phone_clicks, \
                                     conversion_rate, last_updated";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      variant_id:      row.get(0)?,
      page_views:      row.get(1)?,
      cta_clicks:      row.get(2)?,
      form_submits:    row.get(3)?,
      phone_clicks:    row.get(4)?,
      conversion_rate: row.get(5)?,
      last_updated:    row.get(6)?,
    })
  }

  /// Decode the row. Rows for ids no longer in the registry yield `None`.
  pub fn into_stats(self) -> Result<Option<VariantStats>> {
    let Ok(variant_id) = VariantId::parse(&self.variant_id) else {
      return Ok(None);
    };
    Ok(Some(VariantStats {
      variant_id,
      page_views: self.page_views.max(0) as u64,
      cta_clicks: self.cta_clicks.max(0) as u64,
      form_submits: self.form_submits.max(0) as u64,
      phone_clicks: self.phone_clicks.max(0) as u64,
      conversion_rate: self.conversion_rate,
      last_updated: decode_dt(&self.last_updated)?,
    }))
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let a = Utc.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();
    let b = Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
    assert!(encode_dt(a) < encode_dt(b));
    assert_eq!(encode_dt(b), "2024-01-10T00:00:00.000000Z");
  }

  #[test]
  fn storable_dt_round_trips() {
    let now = storable_dt(Utc::now());
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }
}
