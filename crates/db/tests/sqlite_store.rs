//! `SqliteStore` behaviour through the core store traits.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use webcheck_core::store::{AlertLog, BaselineStore, DiffLog, DiffRecord, EventSink};
use webcheck_core::types::Timestamp;
use webcheck_core::{AlertCategory, CoreError, Deduplicator, EventLevel};
use webcheck_db::repositories::{AlertRepo, BaselineRepo, DiffRepo, EventRepo};
use webcheck_db::SqliteStore;

const URL: &str = "https://example.org/";

fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2026, 5, 4, 9, 30, 0).unwrap()
}

fn lines(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn absent_baseline_is_none() {
    let store = SqliteStore::new(common::memory_pool().await);
    assert_eq!(store.get_baseline(URL).await.unwrap(), None);
}

#[tokio::test]
async fn set_baseline_is_replace_not_merge() {
    let store = SqliteStore::new(common::memory_pool().await);

    store.set_baseline(URL, t0(), &lines(&["a", "b", "c"])).await.unwrap();
    store
        .set_baseline(URL, t0() + Duration::minutes(1), &lines(&["z"]))
        .await
        .unwrap();

    assert_eq!(store.get_baseline(URL).await.unwrap(), Some(lines(&["z"])));
}

#[tokio::test]
async fn single_blank_line_baseline_reads_back_unchanged() {
    let store = SqliteStore::new(common::memory_pool().await);

    store.set_baseline(URL, t0(), &lines(&[""])).await.unwrap();
    assert_eq!(store.get_baseline(URL).await.unwrap(), Some(lines(&[""])));

    store.set_baseline(URL, t0(), &[]).await.unwrap();
    assert_eq!(store.get_baseline(URL).await.unwrap(), Some(Vec::new()));
}

#[tokio::test]
async fn unreadable_baseline_content_is_a_persistence_error() {
    let store = SqliteStore::new(common::memory_pool().await);
    BaselineRepo::upsert(store.pool(), URL, "not json", t0()).await.unwrap();

    assert_matches!(store.get_baseline(URL).await, Err(CoreError::Persistence(_)));
}

#[tokio::test]
async fn save_diff_appends() {
    let store = SqliteStore::new(common::memory_pool().await);
    for ratio in [0.5, 0.6] {
        store
            .save_diff(&DiffRecord {
                created_at: t0(),
                url: URL.into(),
                ratio,
                diff: "-a\n+b".into(),
            })
            .await
            .unwrap();
    }
    assert_eq!(DiffRepo::list_for_url(store.pool(), URL, 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn deduplicator_window_over_sqlite() {
    let store = SqliteStore::new(common::memory_pool().await);
    let dedup = Deduplicator::from_minutes(30);

    dedup.record(&store, URL, AlertCategory::ContentDrift, t0()).await.unwrap();
    assert!(dedup
        .should_suppress(&store, URL, AlertCategory::ContentDrift, t0() + Duration::minutes(10))
        .await
        .unwrap());
    assert!(!dedup
        .should_suppress(&store, URL, AlertCategory::ContentDrift, t0() + Duration::minutes(31))
        .await
        .unwrap());

    let pruned = dedup.prune(&store, t0() + Duration::minutes(31)).await.unwrap();
    assert_eq!(pruned, 1);

    let rows = AlertRepo::list_for_url(store.pool(), URL).await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn alert_rows_convert_to_domain_records() {
    let store = SqliteStore::new(common::memory_pool().await);
    Deduplicator::from_minutes(30)
        .record(&store, URL, AlertCategory::UntrustedExternal, t0())
        .await
        .unwrap();

    let rows = AlertRepo::list_for_url(store.pool(), URL).await.unwrap();
    let record = rows[0].to_record().unwrap();
    assert_eq!(record.category, AlertCategory::UntrustedExternal);
    assert_eq!(record.created_at, t0());
    assert!(store.has_alert_after(URL, AlertCategory::UntrustedExternal, t0() - Duration::seconds(1)).await.unwrap());
}

#[tokio::test]
async fn events_are_persisted_with_level() {
    let store = SqliteStore::new(common::memory_pool().await);
    store
        .record_event(t0(), EventLevel::Warn, "Run resulted in issues being identified")
        .await
        .unwrap();
    let events = EventRepo::list_recent(store.pool(), 5, 0).await.unwrap();
    assert_eq!(events[0].level, "WARN");
}

#[tokio::test]
async fn closed_pool_surfaces_persistence_error() {
    let pool = common::memory_pool().await;
    let store = SqliteStore::new(pool.clone());
    pool.close().await;
    assert_matches!(store.get_baseline(URL).await, Err(CoreError::Persistence(_)));
}
