//! [`SqliteStore`] — the SQLite implementation of [`EventStore`].

use std::{num::NonZeroUsize, path::Path};

use chrono::{DateTime, Utc};
use tally_core::{
  event::{Event, EventType, NewEvent},
  stats::{Aggregator, StatsSnapshot},
  store::{DEFAULT_MAX_EVENTS, EventQuery, EventStore},
  variant::VariantId,
};

use crate::{
  Result,
  encode::{
    RawEvent, RawStats, encode_dt, encode_metadata, encode_uuid, storable_dt,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally event store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted, and every
/// clone shares the same worker thread, so all writes stay serialized.
#[derive(Clone)]
pub struct SqliteStore {
  conn:       tokio_rusqlite::Connection,
  max_events: usize,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation, and seed
  /// a zero stats row for every variant.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, max_events: DEFAULT_MAX_EVENTS };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, max_events: DEFAULT_MAX_EVENTS };
    store.init_schema().await?;
    Ok(store)
  }

  /// Change the retention bound. The next append trims down to it.
  pub fn with_max_events(mut self, max_events: NonZeroUsize) -> Self {
    self.max_events = max_events.get();
    self
  }

  pub fn max_events(&self) -> usize { self.max_events }

  async fn init_schema(&self) -> Result<()> {
    let now = encode_dt(storable_dt(Utc::now()));
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(SCHEMA)?;
        for id in VariantId::all() {
          conn.execute(
            "INSERT OR IGNORE INTO variant_stats (variant_id, last_updated)
             VALUES (?1, ?2)",
            rusqlite::params![id.as_str(), now],
          )?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Transaction helpers ─────────────────────────────────────────────────────
//
// These run on the connection thread, inside whatever transaction the caller
// opened.

/// Delete the oldest rows (by insertion order) beyond `keep`.
///
/// A bound past `i64::MAX` is clamped; SQLite reads a negative `OFFSET` as 0,
/// which would empty the table.
fn trim_to(conn: &rusqlite::Connection, keep: usize) -> rusqlite::Result<usize> {
  let offset = i64::try_from(keep).unwrap_or(i64::MAX);
  conn.execute(
    "DELETE FROM events
     WHERE seq <= (SELECT seq FROM events ORDER BY seq DESC LIMIT 1 OFFSET ?1)",
    rusqlite::params![offset],
  )
}

/// Fold every stored event into a fresh snapshot.
fn fold_events(
  conn: &rusqlite::Connection,
  now: DateTime<Utc>,
) -> rusqlite::Result<StatsSnapshot> {
  let mut agg = Aggregator::new(now);
  let mut stmt =
    conn.prepare("SELECT variant_id, event_type FROM events ORDER BY seq")?;
  let mut rows = stmt.query([])?;
  while let Some(row) = rows.next()? {
    let variant_id: String = row.get(0)?;
    let event_type: String = row.get(1)?;
    // Only ever written from a parsed `EventType`; skip anything else.
    if let Ok(t) = EventType::parse(&event_type) {
      agg.observe(&variant_id, t);
    }
  }
  Ok(agg.finish())
}

/// Overwrite every stats row with the values in `snapshot`.
fn write_snapshot(
  conn: &rusqlite::Connection,
  snapshot: &StatsSnapshot,
) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare(
    "INSERT OR REPLACE INTO variant_stats (
       variant_id, page_views, cta_clicks, form_submits, phone_clicks,
       conversion_rate, last_updated
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
  )?;
  for s in snapshot.iter() {
    stmt.execute(rusqlite::params![
      s.variant_id.as_str(),
      s.page_views as i64,
      s.cta_clicks as i64,
      s.form_submits as i64,
      s.phone_clicks as i64,
      s.conversion_rate,
      encode_dt(s.last_updated),
    ])?;
  }
  Ok(())
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = crate::Error;

  async fn append(&self, input: NewEvent) -> Result<Event> {
    let now = storable_dt(Utc::now());
    let mut event = input.into_event(now);
    event.timestamp = storable_dt(event.timestamp);

    let event_id_str  = encode_uuid(event.id);
    let variant_id    = event.variant_id.clone();
    let event_type    = event.event_type.as_str();
    let locale        = event.locale.clone();
    let timestamp_str = encode_dt(event.timestamp);
    let metadata_str  = event.metadata.as_ref().map(encode_metadata).transpose()?;
    let user_agent    = event.user_agent.clone();
    let referrer      = event.referrer.clone();
    let keep          = self.max_events;

    let evicted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO events (
             event_id, variant_id, event_type, locale, timestamp,
             metadata, user_agent, referrer
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            event_id_str,
            variant_id,
            event_type,
            locale,
            timestamp_str,
            metadata_str,
            user_agent,
            referrer,
          ],
        )?;
        let evicted = trim_to(&tx, keep)?;
        let snapshot = fold_events(&tx, now)?;
        write_snapshot(&tx, &snapshot)?;
        tx.commit()?;
        Ok(evicted)
      })
      .await?;

    if evicted > 0 {
      tracing::debug!(evicted, "trimmed event log to retention bound");
    }
    Ok(event)
  }

  async fn query(&self, query: &EventQuery) -> Result<Vec<Event>> {
    let variant_id = query.variant_id.clone();
    let from_str   = query.from.map(storable_dt).map(encode_dt);
    let to_str     = query.to.map(storable_dt).map(encode_dt);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM events
           WHERE (?1 IS NULL OR variant_id = ?1)
             AND (?2 IS NULL OR timestamp >= ?2)
             AND (?3 IS NULL OR timestamp <= ?3)
           ORDER BY seq",
          RawEvent::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![variant_id, from_str, to_str],
            RawEvent::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn recompute(&self) -> Result<StatsSnapshot> {
    let now = storable_dt(Utc::now());
    let snapshot = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let snapshot = fold_events(&tx, now)?;
        write_snapshot(&tx, &snapshot)?;
        tx.commit()?;
        Ok(snapshot)
      })
      .await?;
    Ok(snapshot)
  }

  async fn current_stats(&self) -> Result<StatsSnapshot> {
    let raws: Vec<RawStats> = self
      .conn
      .call(|conn| {
        let sql = format!("SELECT {} FROM variant_stats", RawStats::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawStats::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut rows = Vec::with_capacity(raws.len());
    for raw in raws {
      if let Some(stats) = raw.into_stats()? {
        rows.push(stats);
      }
    }
    Ok(StatsSnapshot::from_rows(rows, storable_dt(Utc::now())))
  }

  async fn clear(&self) -> Result<()> {
    let snapshot = StatsSnapshot::empty(storable_dt(Utc::now()));
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM events", [])?;
        write_snapshot(&tx, &snapshot)?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
