//! Storage backend tests
//!
//! Tests for SeaOrmStorage using temporary SQLite databases.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use blogpulse::analytics::{DeviceDescriptor, DeviceType, PageView};
use blogpulse::config::{AnalyticsConfig, DatabaseConfig};
use blogpulse::services::AnalyticsService;
use blogpulse::storage::{
    AnalyticsStore, NewPathRecord, NewPost, PathRecordUpdate, PostStatus, SeaOrmStorage,
    StorageFactory,
};

/// 创建临时 SQLite 数据库的存储实例
async fn create_temp_storage() -> (SeaOrmStorage, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..DatabaseConfig::default()
    };

    let storage = SeaOrmStorage::new(&config, "sqlite")
        .await
        .expect("Failed to create storage");

    (storage, temp_dir)
}

fn new_path(path: &str, referrer: Option<&str>) -> NewPathRecord {
    NewPathRecord {
        path: path.to_string(),
        viewed_at: Utc::now(),
        referrer: referrer.map(str::to_string),
        user_agent: None,
        device: DeviceDescriptor::default(),
    }
}

fn update(referrer: Option<&str>, user_agent: Option<&str>) -> PathRecordUpdate {
    PathRecordUpdate {
        viewed_at: Utc::now(),
        referrer: referrer.map(str::to_string),
        user_agent: user_agent.map(str::to_string),
        device: DeviceDescriptor::from_user_agent(user_agent),
    }
}

// =============================================================================
// 基础
// =============================================================================

#[tokio::test]
async fn test_storage_creation_and_ping() {
    let (storage, _dir) = create_temp_storage().await;
    assert_eq!(storage.backend_name(), "sqlite");
    assert!(storage.ping().await.is_ok());
}

#[tokio::test]
async fn test_storage_factory_infers_sqlite() {
    let temp_dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        database_url: format!(
            "sqlite://{}?mode=rwc",
            temp_dir.path().join("factory.db").display()
        ),
        ..DatabaseConfig::default()
    };

    let storage = StorageFactory::create(&config).await.unwrap();
    assert_eq!(storage.backend_name(), "sqlite");
}

#[tokio::test]
async fn test_empty_database_url_is_rejected() {
    let config = DatabaseConfig {
        database_url: String::new(),
        ..DatabaseConfig::default()
    };

    let err = SeaOrmStorage::new(&config, "sqlite").await.err().unwrap();
    assert_eq!(err.code(), "E002");
}

#[tokio::test]
async fn test_migrations_are_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let config = DatabaseConfig {
        database_url: format!(
            "sqlite://{}?mode=rwc",
            temp_dir.path().join("twice.db").display()
        ),
        ..DatabaseConfig::default()
    };

    let first = SeaOrmStorage::new(&config, "sqlite").await.unwrap();
    first.create_path_record(new_path("/kept", None)).await.unwrap();
    drop(first);

    let second = SeaOrmStorage::new(&config, "sqlite").await.unwrap();
    assert!(second.find_path_record("/kept").await.unwrap().is_some());
}

// =============================================================================
// path 记录
// =============================================================================

#[tokio::test]
async fn test_create_and_find_path_record() {
    let (storage, _dir) = create_temp_storage().await;

    assert!(storage.find_path_record("/about").await.unwrap().is_none());

    let created = storage
        .create_path_record(new_path("/about", Some("https://google.com/")))
        .await
        .unwrap();
    assert_eq!(created.page_views, 1);

    let found = storage.find_path_record("/about").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.page_views, 1);
    assert_eq!(found.referrer.as_deref(), Some("https://google.com/"));
    assert_eq!(found.device.device_type, DeviceType::Desktop);
}

#[tokio::test]
async fn test_duplicate_path_is_conflict() {
    let (storage, _dir) = create_temp_storage().await;

    storage.create_path_record(new_path("/dup", None)).await.unwrap();
    let err = storage
        .create_path_record(new_path("/dup", None))
        .await
        .unwrap_err();

    assert!(err.is_conflict(), "expected conflict, got {:?}", err);
}

#[tokio::test]
async fn test_increment_keeps_referrer_when_absent() {
    let (storage, _dir) = create_temp_storage().await;
    let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile Safari/604.1";

    let created = storage
        .create_path_record(new_path("/post", Some("https://a.example/")))
        .await
        .unwrap();
    storage
        .increment_path_record(created.id, update(None, Some(ua)))
        .await
        .unwrap();

    let record = storage.find_path_record("/post").await.unwrap().unwrap();
    assert_eq!(record.page_views, 2);
    assert_eq!(record.referrer.as_deref(), Some("https://a.example/"));
    assert_eq!(record.user_agent.as_deref(), Some(ua));
    assert_eq!(record.device.device_type, DeviceType::Mobile);
    assert_eq!(record.device.os, "iOS");
}

#[tokio::test]
async fn test_increment_overwrites_referrer_when_present() {
    let (storage, _dir) = create_temp_storage().await;

    let created = storage
        .create_path_record(new_path("/post", Some("https://a.example/")))
        .await
        .unwrap();
    storage
        .increment_path_record(created.id, update(Some("https://b.example/"), None))
        .await
        .unwrap();

    let record = storage.find_path_record("/post").await.unwrap().unwrap();
    assert_eq!(record.referrer.as_deref(), Some("https://b.example/"));
}

#[tokio::test]
async fn test_top_paths_ordering_and_limit() {
    let (storage, _dir) = create_temp_storage().await;

    for (path, views) in [("/a", 2), ("/b", 5), ("/c", 2), ("/d", 1)] {
        let created = storage.create_path_record(new_path(path, None)).await.unwrap();
        for _ in 1..views {
            storage
                .increment_path_record(created.id, update(None, None))
                .await
                .unwrap();
        }
    }

    let top = storage.top_paths(3).await.unwrap();
    let summary: Vec<(&str, i64)> = top.iter().map(|r| (r.path.as_str(), r.page_views)).collect();
    // 同分按 path 升序
    assert_eq!(summary, vec![("/b", 5), ("/a", 2), ("/c", 2)]);

    assert!(storage.top_paths(0).await.unwrap().is_empty());
}

// =============================================================================
// 文章
// =============================================================================

#[tokio::test]
async fn test_published_post_lookup() {
    let (storage, _dir) = create_temp_storage().await;

    storage
        .create_post(NewPost::published("hello-world", "Hello World"))
        .await
        .unwrap();
    storage
        .create_post(NewPost::draft("secret", "Secret"))
        .await
        .unwrap();

    let post = storage
        .find_published_post("hello-world")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(post.title, "Hello World");
    assert_eq!(post.status, PostStatus::Published);
    assert_eq!(post.view_count, 0);

    // 草稿存在，但不对外可见
    assert!(storage.find_published_post("secret").await.unwrap().is_none());
    assert!(storage.get_post("secret").await.unwrap().is_some());
    assert!(storage.find_published_post("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn test_increment_post_views() {
    let (storage, _dir) = create_temp_storage().await;
    let post = storage
        .create_post(NewPost::published("counted", "Counted"))
        .await
        .unwrap();
    let viewed_at = Utc::now() - Duration::minutes(1);

    storage.increment_post_views(post.id, viewed_at).await.unwrap();
    storage.increment_post_views(post.id, Utc::now()).await.unwrap();

    let post = storage.get_post("counted").await.unwrap().unwrap();
    assert_eq!(post.view_count, 2);
    assert!(post.last_viewed_at.unwrap() > viewed_at);
}

#[tokio::test]
async fn test_increment_missing_post_is_not_found() {
    let (storage, _dir) = create_temp_storage().await;

    let err = storage
        .increment_post_views(9999, Utc::now())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "E008");
}

// =============================================================================
// 记录器 + SQLite
// =============================================================================

#[tokio::test]
async fn test_recorder_against_sqlite() {
    let (storage, _dir) = create_temp_storage().await;
    let storage = Arc::new(storage);
    storage
        .create_post(NewPost::published("first", "First"))
        .await
        .unwrap();

    let service = AnalyticsService::new(storage.clone(), &AnalyticsConfig::default());
    for _ in 0..3 {
        service
            .record_page_view(PageView::new("/blog/first", None, None))
            .await;
    }
    service.record_page_view(PageView::new("/", None, None)).await;

    assert_eq!(storage.get_post("first").await.unwrap().unwrap().view_count, 3);

    let stats = service.get_analytics_stats().await;
    assert_eq!(stats.total_views, 4);
    assert_eq!(stats.top_pages[0].path, "/blog/first");
    assert_eq!(stats.top_pages[0].page_views, 3);
}

#[tokio::test]
async fn test_concurrent_first_views_share_one_record() {
    let (storage, _dir) = create_temp_storage().await;
    let storage = Arc::new(storage);
    let service = Arc::new(AnalyticsService::new(
        storage.clone(),
        &AnalyticsConfig::default(),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .record_page_view(PageView::new("/launch", None, None))
                    .await;
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let top = storage.top_paths(10).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].path, "/launch");
    assert_eq!(top[0].page_views, 8);
}
