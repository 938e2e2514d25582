//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Raw events. Rows are only ever inserted, trimmed from the low end of
-- `seq`, or deleted wholesale.
CREATE TABLE IF NOT EXISTS events (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,  -- insertion order
    event_id    TEXT NOT NULL UNIQUE,
    variant_id  TEXT NOT NULL,   -- as submitted; not checked against the registry
    event_type  TEXT NOT NULL,   -- 'page_view' | 'cta_click' | 'form_submit' | 'phone_click'
    locale      TEXT NOT NULL,
    timestamp   TEXT NOT NULL,   -- fixed-width RFC 3339 UTC, microseconds
    metadata    TEXT,            -- JSON object or NULL
    user_agent  TEXT,
    referrer    TEXT
);

-- Materialised per-variant counters, fully rewritten on every mutation.
CREATE TABLE IF NOT EXISTS variant_stats (
    variant_id      TEXT PRIMARY KEY,
    page_views      INTEGER NOT NULL DEFAULT 0,
    cta_clicks      INTEGER NOT NULL DEFAULT 0,
    form_submits    INTEGER NOT NULL DEFAULT 0,
    phone_clicks    INTEGER NOT NULL DEFAULT 0,
    conversion_rate REAL    NOT NULL DEFAULT 0,
    last_updated    TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS events_variant_idx   ON events(variant_id);
CREATE INDEX IF NOT EXISTS events_timestamp_idx ON events(timestamp);

PRAGMA user_version = 1;
";
