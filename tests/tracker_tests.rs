//! ViewTracker + AnalyticsService 端到端测试
//!
//! tokio 暂停时钟驱动停留计时，记录器写入内存存储。

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use blogpulse::analytics::{
    MemorySessionStorage, PageContext, SessionStorage, TrackState, TrackerConfig, ViewTracker,
};
use blogpulse::config::{AnalyticsConfig, TrackerSettings};
use blogpulse::services::AnalyticsService;
use blogpulse::storage::NewPost;

use common::{CHROME_WINDOWS, MemoryStore};

struct Harness {
    tracker: ViewTracker,
    store: Arc<MemoryStore>,
    session: Arc<MemorySessionStorage>,
}

fn harness(config: TrackerConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(AnalyticsService::new(
        store.clone(),
        &AnalyticsConfig::default(),
    ));
    let session = Arc::new(MemorySessionStorage::new());
    let tracker = ViewTracker::new(config, service, session.clone());
    Harness {
        tracker,
        store,
        session,
    }
}

fn page(path: &str) -> PageContext {
    PageContext::new(path)
        .with_user_agent(CHROME_WINDOWS)
        .with_referrer("https://duckduckgo.com/")
}

fn stamp(minutes_ago: i64) -> String {
    (Utc::now().timestamp_millis() - minutes_ago * 60_000).to_string()
}

#[tokio::test(start_paused = true)]
async fn test_leaving_after_three_seconds_records_nothing() {
    let h = harness(TrackerConfig::default());

    let mount = h.tracker.mount(page("/blog/hello"));
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(mount.unmount(), TrackState::Cancelled);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(h.store.path("/blog/hello").is_none());
    assert!(h.session.get_item("viewed_/blog/hello").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_staying_records_once_and_counts_post() {
    let h = harness(TrackerConfig::default());
    h.store.add_post(NewPost::published("hello", "Hello"));

    let mut mount = h.tracker.mount(page("/blog/hello"));
    assert_eq!(mount.settled().await, TrackState::Tracked);
    tokio::time::sleep(Duration::from_secs(60)).await;

    let record = h.store.path("/blog/hello").unwrap();
    assert_eq!(record.page_views, 1);
    assert_eq!(record.referrer.as_deref(), Some("https://duckduckgo.com/"));
    assert_eq!(h.store.post("hello").unwrap().view_count, 1);
    assert!(h.session.get_item("viewed_/blog/hello").is_some());
}

#[tokio::test(start_paused = true)]
async fn test_reload_within_session_window_is_deduplicated() {
    let h = harness(TrackerConfig::default());

    let mut first = h.tracker.mount(page("/about"));
    assert_eq!(first.settled().await, TrackState::Tracked);
    drop(first);

    // 同一会话内马上回到该页面
    let mut second = h.tracker.mount(page("/about"));
    assert_eq!(second.settled().await, TrackState::Suppressed);

    assert_eq!(h.store.path("/about").unwrap().page_views, 1);
}

#[tokio::test(start_paused = true)]
async fn test_ten_minute_old_mark_suppresses() {
    let h = harness(TrackerConfig::default());
    h.session.set_item("viewed_/about", stamp(10));

    let mut mount = h.tracker.mount(page("/about"));
    assert_eq!(mount.settled().await, TrackState::Suppressed);
    assert!(h.store.path("/about").is_none());
}

#[tokio::test(start_paused = true)]
async fn test_thirty_one_minute_old_mark_allows_view() {
    let h = harness(TrackerConfig::default());
    h.session.set_item("viewed_/about", stamp(31));

    let mut mount = h.tracker.mount(page("/about"));
    assert_eq!(mount.settled().await, TrackState::Tracked);
    assert_eq!(h.store.path("/about").unwrap().page_views, 1);
}

#[tokio::test(start_paused = true)]
async fn test_crawler_is_never_recorded() {
    let h = harness(TrackerConfig::default());

    let ctx = PageContext::new("/")
        .with_user_agent("Mozilla/5.0 (compatible; bingbot/2.0; +http://www.bing.com/bingbot.htm)");
    let mut mount = h.tracker.mount(ctx);
    assert_eq!(mount.settled().await, TrackState::Suppressed);

    assert_eq!(h.store.path_count(), 0);
    assert!(h.session.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_simple_preset_records_without_dedup() {
    let h = harness(TrackerConfig::simple());

    for _ in 0..3 {
        let mut mount = h.tracker.mount(page("/"));
        assert_eq!(mount.settled().await, TrackState::Tracked);
    }

    assert_eq!(h.store.path("/").unwrap().page_views, 3);
    assert!(h.session.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failing_store_does_not_break_tracking() {
    let h = harness(TrackerConfig::default());
    h.store.fail_everything();

    let mut mount = h.tracker.mount(page("/about"));
    assert_eq!(mount.settled().await, TrackState::Tracked);
    assert_eq!(h.store.path_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_settings_from_config_drive_dwell_time() {
    let settings = TrackerSettings {
        min_time_on_page_secs: 10,
        ..TrackerSettings::default()
    };
    let h = harness(TrackerConfig::from_settings(&settings));

    let mount = h.tracker.mount(page("/slow"));
    tokio::time::sleep(Duration::from_secs(7)).await;
    assert_eq!(mount.state(), TrackState::Pending);
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(mount.state(), TrackState::Tracked);
    assert_eq!(h.store.path("/slow").unwrap().page_views, 1);
}
