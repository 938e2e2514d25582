//! The `EventStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! Higher layers (`tally-api`, `tally-server`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  event::{Event, NewEvent},
  stats::StatsSnapshot,
};

/// Default bound on the number of retained events.
pub const DEFAULT_MAX_EVENTS: usize = 10_000;

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`EventStore::query`]. All filters are optional and
/// combine with AND; an empty query is a full scan.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
  /// Raw variant id to match exactly.
  pub variant_id: Option<String>,
  /// Inclusive lower bound on `timestamp`.
  pub from:       Option<DateTime<Utc>>,
  /// Inclusive upper bound on `timestamp`.
  pub to:         Option<DateTime<Utc>>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an event log plus its materialised stats snapshot.
///
/// Implementations must apply each mutation (append + trim + recompute, or
/// clear) as one serialized unit so the snapshot always reflects the log.
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new event, trim the log to its retention bound (oldest first),
  /// and rebuild the stats snapshot. Returns the stored [`Event`].
  fn append(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// Return events matching `query` in insertion order.
  fn query<'a>(
    &'a self,
    query: &'a EventQuery,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + 'a;

  /// Rebuild the stats snapshot from the full event log and persist it.
  fn recompute(
    &self,
  ) -> impl Future<Output = Result<StatsSnapshot, Self::Error>> + Send + '_;

  /// Read the persisted stats snapshot without recomputing it.
  fn current_stats(
    &self,
  ) -> impl Future<Output = Result<StatsSnapshot, Self::Error>> + Send + '_;

  /// Delete every event and reset the snapshot to zero counts.
  fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
