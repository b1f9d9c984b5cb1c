//! 测试共用的内存存储
//!
//! 行为与 SeaOrmStorage 一致（path 唯一、原子自增语义），
//! 另外支持按操作名注入失败和模拟并发首访冲突。

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use blogpulse::errors::{BlogPulseError, Result};
use blogpulse::storage::{
    AnalyticsStore, NewPathRecord, NewPost, PathAnalyticsRecord, PathRecordUpdate, PostRecord,
    PostStatus,
};

#[derive(Default)]
pub struct MemoryStore {
    posts: Mutex<Vec<PostRecord>>,
    paths: Mutex<Vec<PathAnalyticsRecord>>,
    next_id: AtomicI64,
    failing: Mutex<HashSet<&'static str>>,
    conflict_next_create: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 让指定操作返回 DatabaseOperation 错误
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn fail_everything(&self) {
        for op in [
            "find_published_post",
            "increment_post_views",
            "find_path_record",
            "create_path_record",
            "increment_path_record",
            "top_paths",
            "ping",
        ] {
            self.fail(op);
        }
    }

    /// 下一次 create 前先由"另一个请求"插入同一 path，然后返回 Conflict
    pub fn conflict_on_next_create(&self) {
        self.conflict_next_create.store(true, Ordering::SeqCst);
    }

    fn check(&self, op: &'static str) -> Result<()> {
        if self.failing.lock().unwrap().contains(op) {
            return Err(BlogPulseError::database_operation(format!(
                "injected failure: {}",
                op
            )));
        }
        Ok(())
    }

    pub fn add_post(&self, post: NewPost) -> PostRecord {
        let record = PostRecord {
            id: self.next_id(),
            slug: post.slug,
            title: post.title,
            status: post.status,
            view_count: 0,
            last_viewed_at: None,
        };
        self.posts.lock().unwrap().push(record.clone());
        record
    }

    pub fn post(&self, slug: &str) -> Option<PostRecord> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.slug == slug)
            .cloned()
    }

    pub fn path(&self, path: &str) -> Option<PathAnalyticsRecord> {
        self.paths
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.path == path)
            .cloned()
    }

    pub fn path_count(&self) -> usize {
        self.paths.lock().unwrap().len()
    }

    fn insert_path(&self, record: &NewPathRecord) -> PathAnalyticsRecord {
        let created = PathAnalyticsRecord {
            id: self.next_id(),
            path: record.path.clone(),
            page_views: 1,
            last_viewed: record.viewed_at,
            referrer: record.referrer.clone(),
            user_agent: record.user_agent.clone(),
            device: record.device.clone(),
        };
        self.paths.lock().unwrap().push(created.clone());
        created
    }
}

#[async_trait]
impl AnalyticsStore for MemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn find_published_post(&self, slug: &str) -> Result<Option<PostRecord>> {
        self.check("find_published_post")?;
        Ok(self.post(slug).filter(|p| p.status == PostStatus::Published))
    }

    async fn increment_post_views(&self, post_id: i64, viewed_at: DateTime<Utc>) -> Result<()> {
        self.check("increment_post_views")?;
        let mut posts = self.posts.lock().unwrap();
        let post = posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| BlogPulseError::not_found(format!("post {}", post_id)))?;
        post.view_count += 1;
        post.last_viewed_at = Some(viewed_at);
        Ok(())
    }

    async fn find_path_record(&self, path: &str) -> Result<Option<PathAnalyticsRecord>> {
        self.check("find_path_record")?;
        Ok(self.path(path))
    }

    async fn create_path_record(&self, record: NewPathRecord) -> Result<PathAnalyticsRecord> {
        self.check("create_path_record")?;
        if self.conflict_next_create.swap(false, Ordering::SeqCst) {
            self.insert_path(&record);
            return Err(BlogPulseError::conflict(format!(
                "UNIQUE constraint failed: analytics.path ({})",
                record.path
            )));
        }
        if self.path(&record.path).is_some() {
            return Err(BlogPulseError::conflict(record.path));
        }
        Ok(self.insert_path(&record))
    }

    async fn increment_path_record(&self, id: i64, update: PathRecordUpdate) -> Result<()> {
        self.check("increment_path_record")?;
        let mut paths = self.paths.lock().unwrap();
        let record = paths
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| BlogPulseError::not_found(format!("analytics {}", id)))?;
        record.page_views += 1;
        record.last_viewed = update.viewed_at;
        if update.referrer.is_some() {
            record.referrer = update.referrer;
        }
        if update.user_agent.is_some() {
            record.user_agent = update.user_agent;
        }
        record.device = update.device;
        Ok(())
    }

    async fn top_paths(&self, limit: u64) -> Result<Vec<PathAnalyticsRecord>> {
        self.check("top_paths")?;
        let mut paths = self.paths.lock().unwrap().clone();
        paths.sort_by(|a, b| b.page_views.cmp(&a.page_views).then(a.path.cmp(&b.path)));
        paths.truncate(limit as usize);
        Ok(paths)
    }

    async fn ping(&self) -> Result<()> {
        self.check("ping")
    }
}

pub const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
