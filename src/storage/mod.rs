use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::{
    NewPathRecord, NewPost, PathAnalyticsRecord, PathRecordUpdate, PostRecord, PostStatus,
};

/// 浏览计数存储接口
///
/// 记录器只依赖这个 trait；测试里可以用内存实现替换。
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    fn backend_name(&self) -> &str;

    /// 按 slug 查找已发布的文章（草稿不返回）
    async fn find_published_post(&self, slug: &str) -> Result<Option<PostRecord>>;

    /// `view_count = view_count + 1`，并设置 `last_viewed_at`
    async fn increment_post_views(&self, post_id: i64, viewed_at: DateTime<Utc>) -> Result<()>;

    async fn find_path_record(&self, path: &str) -> Result<Option<PathAnalyticsRecord>>;

    /// 创建 path 记录；path 已存在时返回 `BlogPulseError::Conflict`
    async fn create_path_record(&self, record: NewPathRecord) -> Result<PathAnalyticsRecord>;

    /// `page_views = page_views + 1`，覆盖 last_viewed / device，
    /// referrer 和 user_agent 仅在有新值时覆盖
    async fn increment_path_record(&self, id: i64, update: PathRecordUpdate) -> Result<()>;

    /// 按 page_views 降序（同分按 path 升序）取前 `limit` 条
    async fn top_paths(&self, limit: u64) -> Result<Vec<PathAnalyticsRecord>>;

    /// 健康检查
    async fn ping(&self) -> Result<()>;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStorage>> {
        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(&config.database_url)?;

        let storage = SeaOrmStorage::new(config, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
