//! Integration tests for `SqliteStore` against an in-memory database.

use std::{collections::BTreeMap, num::NonZeroUsize};

use chrono::{Duration, TimeZone, Utc};
use tally_core::{
  event::{EventType, NewEvent},
  store::{DEFAULT_MAX_EVENTS, EventQuery, EventStore},
  variant::VariantId,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn append_n(s: &SqliteStore, variant: &str, t: EventType, n: usize) {
  for _ in 0..n {
    s.append(NewEvent::new(variant, t)).await.unwrap();
  }
}

// ─── Initialisation ──────────────────────────────────────────────────────────

#[tokio::test]
async fn fresh_store_has_zero_stats_for_every_variant() {
  let s = store().await;
  assert_eq!(s.max_events(), DEFAULT_MAX_EVENTS);

  let stats = s.current_stats().await.unwrap();
  assert_eq!(stats.iter().count(), 4);
  for v in stats.iter() {
    assert_eq!(v.page_views, 0);
    assert_eq!(v.conversion_rate, 0.0);
  }
  assert!(s.query(&EventQuery::default()).await.unwrap().is_empty());
}

// ─── Append ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn append_assigns_id_and_timestamp() {
  let s = store().await;
  let before = Utc::now() - Duration::seconds(1);

  let ev = s
    .append(NewEvent::new("control", EventType::PageView))
    .await
    .unwrap();
  assert!(ev.timestamp >= before);

  let stored = s.query(&EventQuery::default()).await.unwrap();
  assert_eq!(stored, vec![ev]);
}

#[tokio::test]
async fn append_keeps_optional_fields() {
  let s = store().await;

  let mut metadata = BTreeMap::new();
  metadata.insert("location".to_owned(), serde_json::json!("hero"));
  metadata.insert("success".to_owned(), serde_json::json!(true));

  let mut input = NewEvent::new("variant-b", EventType::CtaClick);
  input.locale = "fr".into();
  input.metadata = Some(metadata.clone());
  input.user_agent = Some("Mozilla/5.0".into());
  input.referrer = Some("https://example.lu/".into());
  s.append(input).await.unwrap();

  let stored = s.query(&EventQuery::default()).await.unwrap();
  assert_eq!(stored.len(), 1);
  let ev = &stored[0];
  assert_eq!(ev.locale, "fr");
  assert_eq!(ev.metadata.as_ref(), Some(&metadata));
  assert_eq!(ev.user_agent.as_deref(), Some("Mozilla/5.0"));
  assert_eq!(ev.referrer.as_deref(), Some("https://example.lu/"));
}

#[tokio::test]
async fn append_updates_only_the_matching_counter() {
  let s = store().await;
  append_n(&s, "variant-a", EventType::CtaClick, 7).await;

  let stats = s.current_stats().await.unwrap();
  let a = stats.get(VariantId::VariantA).unwrap();
  assert_eq!(a.cta_clicks, 7);
  assert_eq!(a.page_views, 0);
  assert_eq!(a.form_submits, 0);
  assert_eq!(a.phone_clicks, 0);
  for other in [VariantId::Control, VariantId::VariantB, VariantId::VariantC] {
    assert_eq!(stats.get(other).unwrap().cta_clicks, 0);
  }
}

#[tokio::test]
async fn snapshot_matches_event_log_after_every_write() {
  let s = store().await;
  append_n(&s, "control", EventType::PageView, 8).await;
  append_n(&s, "control", EventType::FormSubmit, 1).await;
  append_n(&s, "control", EventType::PhoneClick, 1).await;

  let stats = s.current_stats().await.unwrap();
  let c = stats.get(VariantId::Control).unwrap();
  assert_eq!(c.page_views, 8);
  assert_eq!(c.conversion_rate, 25.0);

  // An explicit recompute yields the same counters.
  let again = s.recompute().await.unwrap();
  assert_eq!(again.get(VariantId::Control).unwrap().page_views, 8);
  assert_eq!(again.get(VariantId::Control).unwrap().conversion_rate, 25.0);
}

#[tokio::test]
async fn unknown_variant_is_stored_but_not_counted() {
  let s = store().await;
  s.append(NewEvent::new("bogus", EventType::PageView)).await.unwrap();

  let stored = s.query(&EventQuery::default()).await.unwrap();
  assert_eq!(stored.len(), 1);
  assert_eq!(stored[0].variant_id, "bogus");

  let stats = s.current_stats().await.unwrap();
  assert!(stats.iter().all(|v| v.page_views == 0));
}

#[tokio::test]
async fn winner_scenario_requires_minimum_traffic() {
  let s = store().await;
  append_n(&s, "control", EventType::PageView, 20).await;
  append_n(&s, "variant-a", EventType::PageView, 5).await;
  append_n(&s, "variant-a", EventType::FormSubmit, 2).await;

  let stats = s.current_stats().await.unwrap();
  let control = stats.get(VariantId::Control).unwrap();
  assert_eq!(control.page_views, 20);
  assert_eq!(control.conversion_rate, 0.0);
  assert_eq!(stats.get(VariantId::VariantA).unwrap().conversion_rate, 40.0);
  assert_eq!(stats.winner().unwrap().variant_id, VariantId::Control);
}

// ─── Retention ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn retention_evicts_oldest_first() {
  let s = store()
    .await
    .with_max_events(NonZeroUsize::new(5).unwrap());

  let mut ids = Vec::new();
  for _ in 0..5 {
    ids.push(s.append(NewEvent::new("control", EventType::PageView)).await.unwrap().id);
  }
  let sixth = s
    .append(NewEvent::new("variant-a", EventType::PageView))
    .await
    .unwrap();

  let stored = s.query(&EventQuery::default()).await.unwrap();
  assert_eq!(stored.len(), 5);
  assert!(stored.iter().all(|e| e.id != ids[0]));
  assert_eq!(stored[0].id, ids[1]);
  assert_eq!(stored[4].id, sixth.id);

  // Evicted events no longer count.
  let stats = s.current_stats().await.unwrap();
  assert_eq!(stats.get(VariantId::Control).unwrap().page_views, 4);
  assert_eq!(stats.get(VariantId::VariantA).unwrap().page_views, 1);
}

#[tokio::test]
async fn retention_at_default_bound_evicts_exactly_the_first_event() {
  let s = store().await;

  let first = s
    .append(NewEvent::new("control", EventType::PageView))
    .await
    .unwrap();
  append_n(&s, "control", EventType::PageView, DEFAULT_MAX_EVENTS - 1).await;
  assert_eq!(s.query(&EventQuery::default()).await.unwrap().len(), DEFAULT_MAX_EVENTS);

  let last = s
    .append(NewEvent::new("variant-a", EventType::PageView))
    .await
    .unwrap();

  let stored = s.query(&EventQuery::default()).await.unwrap();
  assert_eq!(stored.len(), DEFAULT_MAX_EVENTS);
  assert!(stored.iter().all(|e| e.id != first.id));
  assert_eq!(stored.last().unwrap().id, last.id);

  let stats = s.current_stats().await.unwrap();
  assert_eq!(
    stats.get(VariantId::Control).unwrap().page_views,
    (DEFAULT_MAX_EVENTS - 1) as u64
  );
  assert_eq!(stats.get(VariantId::VariantA).unwrap().page_views, 1);
}

#[tokio::test]
async fn huge_retention_bound_keeps_everything() {
  let s = store()
    .await
    .with_max_events(NonZeroUsize::new(usize::MAX).unwrap());
  append_n(&s, "control", EventType::PageView, 3).await;

  assert_eq!(s.query(&EventQuery::default()).await.unwrap().len(), 3);
  let stats = s.current_stats().await.unwrap();
  assert_eq!(stats.get(VariantId::Control).unwrap().page_views, 3);
}

#[tokio::test]
async fn retention_is_by_insertion_order_not_timestamp() {
  let s = store()
    .await
    .with_max_events(NonZeroUsize::new(2).unwrap());

  let old = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
  let mut first = NewEvent::new("control", EventType::PageView);
  first.timestamp = Some(Utc::now());
  let first = s.append(first).await.unwrap();

  let mut backdated = NewEvent::new("control", EventType::PageView);
  backdated.timestamp = Some(old);
  let backdated = s.append(backdated).await.unwrap();

  s.append(NewEvent::new("control", EventType::PageView)).await.unwrap();

  let stored = s.query(&EventQuery::default()).await.unwrap();
  assert_eq!(stored.len(), 2);
  assert!(stored.iter().all(|e| e.id != first.id));
  assert_eq!(stored[0].id, backdated.id);
}

// ─── Query ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn query_by_variant() {
  let s = store().await;
  append_n(&s, "control", EventType::PageView, 3).await;
  append_n(&s, "variant-c", EventType::PhoneClick, 2).await;

  let q = EventQuery { variant_id: Some("variant-c".into()), ..Default::default() };
  let events = s.query(&q).await.unwrap();
  assert_eq!(events.len(), 2);
  assert!(events.iter().all(|e| e.event_type == EventType::PhoneClick));
}

#[tokio::test]
async fn query_by_inclusive_date_range() {
  let s = store().await;
  let day = |d| Utc.with_ymd_and_hms(2024, 3, d, 12, 0, 0).unwrap();

  for d in [1, 2, 3, 4] {
    let mut input = NewEvent::new("control", EventType::PageView);
    input.timestamp = Some(day(d));
    s.append(input).await.unwrap();
  }

  let q = EventQuery { from: Some(day(2)), to: Some(day(3)), ..Default::default() };
  let events = s.query(&q).await.unwrap();
  let stamps: Vec<_> = events.iter().map(|e| e.timestamp).collect();
  assert_eq!(stamps, vec![day(2), day(3)]);

  let open_ended = EventQuery { from: Some(day(4)), ..Default::default() };
  assert_eq!(s.query(&open_ended).await.unwrap().len(), 1);
}

// ─── Clear ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn clear_resets_log_and_snapshot() {
  let s = store().await;
  append_n(&s, "control", EventType::PageView, 4).await;
  append_n(&s, "variant-b", EventType::FormSubmit, 1).await;

  s.clear().await.unwrap();

  assert!(s.query(&EventQuery::default()).await.unwrap().is_empty());
  let stats = s.current_stats().await.unwrap();
  assert_eq!(stats.iter().count(), 4);
  assert!(stats.iter().all(|v| v.page_views == 0 && v.form_submits == 0));
}

// ─── Concurrency & persistence ───────────────────────────────────────────────

#[tokio::test]
async fn concurrent_appends_do_not_lose_updates() {
  let s = store().await;

  let mut handles = Vec::new();
  for i in 0..40 {
    let s = s.clone();
    let variant = if i % 2 == 0 { "control" } else { "variant-a" };
    handles.push(tokio::spawn(async move {
      s.append(NewEvent::new(variant, EventType::PageView)).await
    }));
  }
  for h in handles {
    h.await.unwrap().unwrap();
  }

  let stats = s.current_stats().await.unwrap();
  assert_eq!(stats.get(VariantId::Control).unwrap().page_views, 20);
  assert_eq!(stats.get(VariantId::VariantA).unwrap().page_views, 20);
}

#[tokio::test]
async fn data_survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("tally.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    append_n(&s, "variant-b", EventType::PageView, 3).await;
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.query(&EventQuery::default()).await.unwrap().len(), 3);
  let stats = s.current_stats().await.unwrap();
  assert_eq!(stats.get(VariantId::VariantB).unwrap().page_views, 3);
}
