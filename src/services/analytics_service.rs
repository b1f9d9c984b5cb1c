//! 浏览计数记录器
//!
//! 服务端聚合：每次上报累加 path 计数，命中 `/blog/{slug}` 且文章已发布时
//! 同步累加文章的 view_count。供 HTTP API、CLI 和进程内 `ViewTracker` 共用。
//!
//! 记录失败只写日志，不向调用方抛出：统计不能影响页面渲染。

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

use crate::analytics::{
    DeviceDescriptor, MAX_PATH_LEN, PageView, PageViewSink, is_trackable_path,
};
use crate::config::AnalyticsConfig;
use crate::errors::{BlogPulseError, Result};
use crate::storage::{AnalyticsStore, NewPathRecord, PathRecordUpdate};

/// 热门页面
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPage {
    pub path: String,
    pub page_views: i64,
}

/// 汇总统计
///
/// `total_views` 只是 `top_pages` 这一批的求和，不是全站总量。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsStats {
    pub total_views: i64,
    pub top_pages: Vec<TopPage>,
}

pub struct AnalyticsService {
    store: Arc<dyn AnalyticsStore>,
    top_pages_limit: u64,
    blog_path_prefix: String,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn AnalyticsStore>, config: &AnalyticsConfig) -> Self {
        Self {
            store,
            top_pages_limit: config.top_pages_limit,
            blog_path_prefix: config.blog_path_prefix.clone(),
        }
    }

    pub fn store(&self) -> &Arc<dyn AnalyticsStore> {
        &self.store
    }

    /// 记录一次页面浏览，任何失败都只记日志
    pub async fn record_page_view(&self, view: PageView) {
        let path = view.path.clone();
        if let Err(e) = self.try_record_page_view(view).await {
            error!("Failed to record page view for {}: {}", path, e);
        }
    }

    /// 与 `record_page_view` 相同，但把错误返回给调用方（CLI 使用）
    ///
    /// 文章计数在 path 计数之前写入；path 计数失败时已完成的文章计数不会回滚。
    pub async fn try_record_page_view(&self, view: PageView) -> Result<()> {
        let view = view.normalized();
        if !is_trackable_path(&view.path) {
            return Err(BlogPulseError::validation(format!(
                "path 必须以 '/' 开头且不超过 {} 个字符",
                MAX_PATH_LEN
            )));
        }
        let now = Utc::now();
        let device = DeviceDescriptor::from_user_agent(view.user_agent.as_deref());

        if let Some(slug) = self.blog_post_slug(&view.path) {
            self.bump_post(slug, now).await?;
        }

        self.bump_path(view, device, now).await
    }

    async fn bump_post(&self, slug: &str, now: DateTime<Utc>) -> Result<()> {
        match self.store.find_published_post(slug).await? {
            Some(post) => {
                self.store.increment_post_views(post.id, now).await?;
                trace!("Post view counted: {} (id={})", slug, post.id);
            }
            None => {
                trace!("No published post for slug {}, skipping post counter", slug);
            }
        }
        Ok(())
    }

    async fn bump_path(
        &self,
        view: PageView,
        device: DeviceDescriptor,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if let Some(existing) = self.store.find_path_record(&view.path).await? {
            let update = PathRecordUpdate {
                viewed_at: now,
                referrer: view.referrer,
                user_agent: view.user_agent,
                device,
            };
            return self.store.increment_path_record(existing.id, update).await;
        }

        let record = NewPathRecord {
            path: view.path,
            viewed_at: now,
            referrer: view.referrer,
            user_agent: view.user_agent,
            device,
        };

        match self.store.create_path_record(record.clone()).await {
            Ok(created) => {
                debug!("First view recorded for {}", created.path);
                Ok(())
            }
            // 并发首访：另一个请求先插入了，改走自增
            Err(e) if e.is_conflict() => {
                warn!("Concurrent first view for {}, falling back to increment", record.path);
                let existing = self
                    .store
                    .find_path_record(&record.path)
                    .await?
                    .ok_or_else(|| {
                        BlogPulseError::not_found(format!(
                            "analytics 记录在冲突后消失: {}",
                            record.path
                        ))
                    })?;
                self.store
                    .increment_path_record(existing.id, record.into())
                    .await
            }
            Err(e) => Err(e),
        }
    }

    /// `{prefix}{slug}`，slug 非空且不含 `/`
    pub fn blog_post_slug<'a>(&self, path: &'a str) -> Option<&'a str> {
        let slug = path.strip_prefix(self.blog_path_prefix.as_str())?;
        if slug.is_empty() || slug.contains('/') {
            return None;
        }
        Some(slug)
    }

    /// 热门页面统计，失败时返回空统计
    pub async fn get_analytics_stats(&self) -> AnalyticsStats {
        match self.try_get_analytics_stats().await {
            Ok(stats) => stats,
            Err(e) => {
                error!("Failed to load analytics stats: {}", e);
                AnalyticsStats::default()
            }
        }
    }

    pub async fn try_get_analytics_stats(&self) -> Result<AnalyticsStats> {
        let records = self.store.top_paths(self.top_pages_limit).await?;

        let top_pages: Vec<TopPage> = records
            .into_iter()
            .map(|r| TopPage {
                path: r.path,
                page_views: r.page_views,
            })
            .collect();
        let total_views = top_pages.iter().map(|p| p.page_views).sum();

        Ok(AnalyticsStats {
            total_views,
            top_pages,
        })
    }
}

#[async_trait]
impl PageViewSink for AnalyticsService {
    async fn record_page_view(&self, view: PageView) {
        AnalyticsService::record_page_view(self, view).await;
    }
}
