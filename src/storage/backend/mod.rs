//! SeaORM storage backend
//!
//! 支持 SQLite、MySQL/MariaDB、PostgreSQL。

mod connection;
mod converters;
mod page_analytics;
mod posts;
pub mod retry;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::errors::{BlogPulseError, Result};
use crate::storage::AnalyticsStore;
use crate::storage::models::{
    NewPathRecord, NewPost, PathAnalyticsRecord, PathRecordUpdate, PostRecord,
};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{model_to_path_record, model_to_post, new_path_to_active_model};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(BlogPulseError::database_config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// 规范化 backend 名称
pub fn normalize_backend_name(backend: &str) -> String {
    match backend {
        "mariadb" => "mysql".to_string(),
        other => other.to_string(),
    }
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    pub async fn new(config: &DatabaseConfig, backend_name: &str) -> Result<Self> {
        if config.database_url.is_empty() {
            return Err(BlogPulseError::database_config(
                "database_url 未设置".to_string(),
            ));
        }

        let backend_name = normalize_backend_name(backend_name);

        // 根据不同数据库类型配置连接选项
        let db = if backend_name == "sqlite" {
            connect_sqlite(&config.database_url).await?
        } else {
            connect_generic(config, &backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name,
            retry_config: retry::RetryConfig::from(config),
        };

        // 运行迁移
        run_migrations(&storage.db).await?;

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    /// 获取数据库连接
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl AnalyticsStore for SeaOrmStorage {
    fn backend_name(&self) -> &str {
        &self.backend_name
    }

    async fn find_published_post(&self, slug: &str) -> Result<Option<PostRecord>> {
        self.find_published_post_by_slug(slug).await
    }

    async fn increment_post_views(&self, post_id: i64, viewed_at: DateTime<Utc>) -> Result<()> {
        self.bump_post_view_count(post_id, viewed_at).await
    }

    async fn find_path_record(&self, path: &str) -> Result<Option<PathAnalyticsRecord>> {
        self.find_analytics_by_path(path).await
    }

    async fn create_path_record(&self, record: NewPathRecord) -> Result<PathAnalyticsRecord> {
        self.insert_analytics(record).await
    }

    async fn increment_path_record(&self, id: i64, update: PathRecordUpdate) -> Result<()> {
        self.bump_analytics(id, update).await
    }

    async fn top_paths(&self, limit: u64) -> Result<Vec<PathAnalyticsRecord>> {
        self.load_top_paths(limit).await
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await.map_err(|e| {
            BlogPulseError::database_connection(format!(
                "{} 连接检查失败: {}",
                self.backend_name.to_uppercase(),
                e
            ))
        })
    }
}

impl SeaOrmStorage {
    /// 插入一篇文章（供嵌入方从 CMS 同步文章，以及测试使用）
    pub async fn create_post(&self, post: NewPost) -> Result<PostRecord> {
        self.insert_post(post).await
    }

    /// 按 slug 查找文章（不区分状态）
    pub async fn get_post(&self, slug: &str) -> Result<Option<PostRecord>> {
        self.find_post_by_slug(slug).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(
            infer_backend_from_url("sqlite://blogpulse.db?mode=rwc").unwrap(),
            "sqlite"
        );
        assert_eq!(infer_backend_from_url("data/views.db").unwrap(), "sqlite");
        assert_eq!(
            infer_backend_from_url("mariadb://root@localhost/blog").unwrap(),
            "mysql"
        );
        assert_eq!(
            infer_backend_from_url("postgresql://localhost/blog").unwrap(),
            "postgres"
        );
        assert!(infer_backend_from_url("redis://localhost").is_err());
    }

    #[test]
    fn test_normalize_backend_name() {
        assert_eq!(normalize_backend_name("mariadb"), "mysql");
        assert_eq!(normalize_backend_name("sqlite"), "sqlite");
    }
}
