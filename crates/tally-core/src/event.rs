//! Conversion-funnel events: the raw, immutable record of visitor actions.
//!
//! Events are written once and never individually updated or deleted. The
//! log is only ever trimmed from the oldest end or cleared wholesale.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result, variant::VariantId};

/// Free-form, string-keyed event metadata.
pub type Metadata = BTreeMap<String, serde_json::Value>;

// ─── EventType ───────────────────────────────────────────────────────────────

/// The kind of tracked interaction.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
  PageView,
  CtaClick,
  FormSubmit,
  PhoneClick,
}

impl EventType {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownEventType(s.to_owned()))
  }

  /// Whether this event counts towards the conversion rate.
  pub fn is_conversion(self) -> bool {
    matches!(self, Self::FormSubmit | Self::PhoneClick)
  }
}

// ─── Event ───────────────────────────────────────────────────────────────────

/// A recorded visitor interaction.
///
/// `variant_id` is kept exactly as submitted: the store does not check it
/// against the registry, and aggregation skips ids it does not recognise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  pub id:         Uuid,
  pub variant_id: String,
  pub event_type: EventType,
  pub locale:     String,
  pub timestamp:  DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata:   Option<Metadata>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_agent: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub referrer:   Option<String>,
}

impl Event {
  /// The registry variant this event belongs to, if the id is known.
  pub fn variant(&self) -> Option<VariantId> {
    VariantId::parse(&self.variant_id).ok()
  }
}

// ─── NewEvent ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::EventStore::append`]. The id is always assigned
/// by the store; the timestamp is stamped with the receipt time when absent.
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub variant_id: String,
  pub event_type: EventType,
  pub locale:     String,
  pub timestamp:  Option<DateTime<Utc>>,
  pub metadata:   Option<Metadata>,
  pub user_agent: Option<String>,
  pub referrer:   Option<String>,
}

impl NewEvent {
  /// Convenience constructor with the default locale and no optional fields.
  pub fn new(variant_id: impl Into<String>, event_type: EventType) -> Self {
    Self {
      variant_id: variant_id.into(),
      event_type,
      locale: "en".to_owned(),
      timestamp: None,
      metadata: None,
      user_agent: None,
      referrer: None,
    }
  }

  /// Materialise the stored [`Event`], assigning a fresh id and stamping
  /// `now` if no timestamp was supplied.
  pub fn into_event(self, now: DateTime<Utc>) -> Event {
    Event {
      id:         Uuid::new_v4(),
      variant_id: self.variant_id,
      event_type: self.event_type,
      locale:     self.locale,
      timestamp:  self.timestamp.unwrap_or(now),
      metadata:   self.metadata,
      user_agent: self.user_agent,
      referrer:   self.referrer,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn event_type_wire_form() {
    assert_eq!(EventType::PageView.as_str(), "page_view");
    assert_eq!(EventType::parse("phone_click").unwrap(), EventType::PhoneClick);
    assert!(matches!(
      EventType::parse("scroll_depth"),
      Err(Error::UnknownEventType(_))
    ));
    assert!(EventType::FormSubmit.is_conversion());
    assert!(!EventType::CtaClick.is_conversion());
  }

  #[test]
  fn into_event_keeps_supplied_timestamp() {
    let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let mut input = NewEvent::new("control", EventType::PageView);
    input.timestamp = Some(ts);
    assert_eq!(input.into_event(now).timestamp, ts);

    let stamped = NewEvent::new("control", EventType::PageView).into_event(now);
    assert_eq!(stamped.timestamp, now);
  }

  #[test]
  fn unknown_variant_is_kept_verbatim() {
    let ev = NewEvent::new("bogus", EventType::PageView).into_event(Utc::now());
    assert_eq!(ev.variant_id, "bogus");
    assert_eq!(ev.variant(), None);
  }
}
