//! Per-variant conversion statistics.
//!
//! The snapshot is a materialised view of the event log: it is always rebuilt
//! from scratch by folding every event through an [`Aggregator`], never
//! patched in place.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
  event::{Event, EventType},
  variant::VariantId,
};

/// A variant needs strictly more page views than this to be named winner.
pub const MIN_WINNER_PAGE_VIEWS: u64 = 10;

/// `conversions / page_views * 100`, or 0 when there were no page views.
pub fn conversion_rate(conversions: u64, page_views: u64) -> f64 {
  if page_views == 0 {
    return 0.0;
  }
  conversions as f64 / page_views as f64 * 100.0
}

// ─── VariantStats ────────────────────────────────────────────────────────────

/// Aggregate counters for one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantStats {
  pub variant_id:      VariantId,
  pub page_views:      u64,
  pub cta_clicks:      u64,
  pub form_submits:    u64,
  pub phone_clicks:    u64,
  pub conversion_rate: f64,
  pub last_updated:    DateTime<Utc>,
}

impl VariantStats {
  pub fn zero(variant_id: VariantId, now: DateTime<Utc>) -> Self {
    Self {
      variant_id,
      page_views: 0,
      cta_clicks: 0,
      form_submits: 0,
      phone_clicks: 0,
      conversion_rate: 0.0,
      last_updated: now,
    }
  }

  pub fn conversions(&self) -> u64 { self.form_submits + self.phone_clicks }

  fn record(&mut self, event_type: EventType) {
    match event_type {
      EventType::PageView => self.page_views += 1,
      EventType::CtaClick => self.cta_clicks += 1,
      EventType::FormSubmit => self.form_submits += 1,
      EventType::PhoneClick => self.phone_clicks += 1,
    }
  }
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// Stats for every known variant, keyed by id in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsSnapshot(BTreeMap<VariantId, VariantStats>);

impl StatsSnapshot {
  /// A snapshot with zero counters for every variant.
  pub fn empty(now: DateTime<Utc>) -> Self {
    Self(
      VariantId::iter()
        .map(|id| (id, VariantStats::zero(id, now)))
        .collect(),
    )
  }

  /// Build a snapshot from stored rows, filling any missing variant with
  /// zeros.
  pub fn from_rows(
    rows: impl IntoIterator<Item = VariantStats>,
    now: DateTime<Utc>,
  ) -> Self {
    let mut snapshot = Self::empty(now);
    for row in rows {
      snapshot.0.insert(row.variant_id, row);
    }
    snapshot
  }

  pub fn get(&self, id: VariantId) -> Option<&VariantStats> { self.0.get(&id) }

  pub fn iter(&self) -> impl Iterator<Item = &VariantStats> { self.0.values() }

  /// The variant with the highest conversion rate among those with more than
  /// [`MIN_WINNER_PAGE_VIEWS`] page views. Ties go to the earlier variant.
  pub fn winner(&self) -> Option<&VariantStats> {
    self
      .iter()
      .filter(|s| s.page_views > MIN_WINNER_PAGE_VIEWS)
      .fold(None, |best: Option<&VariantStats>, s| match best {
        Some(b) if b.conversion_rate >= s.conversion_rate => Some(b),
        _ => Some(s),
      })
  }

  /// Totals across all variants plus the current winner.
  pub fn summary(&self) -> Summary {
    let totals = self.iter().fold(Totals::default(), |acc, s| Totals {
      page_views:   acc.page_views + s.page_views,
      cta_clicks:   acc.cta_clicks + s.cta_clicks,
      form_submits: acc.form_submits + s.form_submits,
      phone_clicks: acc.phone_clicks + s.phone_clicks,
    });
    Summary {
      average_conversion_rate: conversion_rate(
        totals.form_submits + totals.phone_clicks,
        totals.page_views,
      ),
      totals,
      winner: self.winner().cloned(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
  pub page_views:   u64,
  pub cta_clicks:   u64,
  pub form_submits: u64,
  pub phone_clicks: u64,
}

/// Dashboard headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
  pub totals:                  Totals,
  pub average_conversion_rate: f64,
  pub winner:                  Option<VariantStats>,
}

// ─── Aggregator ──────────────────────────────────────────────────────────────

/// Folds events into a fresh [`StatsSnapshot`].
#[derive(Debug, Clone)]
pub struct Aggregator {
  stats: BTreeMap<VariantId, VariantStats>,
}

impl Aggregator {
  pub fn new(now: DateTime<Utc>) -> Self { Self { stats: StatsSnapshot::empty(now).0 } }

  /// Count one event. Variant ids outside the registry are ignored.
  pub fn observe(&mut self, variant_id: &str, event_type: EventType) {
    let Ok(id) = VariantId::parse(variant_id) else {
      return;
    };
    if let Some(s) = self.stats.get_mut(&id) {
      s.record(event_type);
    }
  }

  /// Compute conversion rates and return the finished snapshot.
  pub fn finish(mut self) -> StatsSnapshot {
    for s in self.stats.values_mut() {
      s.conversion_rate = conversion_rate(s.conversions(), s.page_views);
    }
    StatsSnapshot(self.stats)
  }
}

/// Aggregate a slice of events in one go.
pub fn aggregate<'a>(
  events: impl IntoIterator<Item = &'a Event>,
  now: DateTime<Utc>,
) -> StatsSnapshot {
  let mut agg = Aggregator::new(now);
  for e in events {
    agg.observe(&e.variant_id, e.event_type);
  }
  agg.finish()
}
