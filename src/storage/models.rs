use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::analytics::DeviceDescriptor;

/// 文章发布状态
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub status: PostStatus,
    pub view_count: i64,
    pub last_viewed_at: Option<DateTime<Utc>>,
}

/// 新建文章，计数器总是从 0 开始
///
/// 文章内容由 CMS 维护，这里只供嵌入方同步文章和测试使用。
#[derive(Debug, Clone)]
pub struct NewPost {
    pub slug: String,
    pub title: String,
    pub status: PostStatus,
}

impl NewPost {
    pub fn published(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            status: PostStatus::Published,
        }
    }

    pub fn draft(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            status: PostStatus::Draft,
        }
    }
}

/// 单个 path 的累计浏览记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathAnalyticsRecord {
    pub id: i64,
    pub path: String,
    pub page_views: i64,
    pub last_viewed: DateTime<Utc>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub device: DeviceDescriptor,
}

/// 首次浏览时创建的记录，`page_views` 固定为 1
#[derive(Debug, Clone)]
pub struct NewPathRecord {
    pub path: String,
    pub viewed_at: DateTime<Utc>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub device: DeviceDescriptor,
}

/// 后续浏览的增量更新
///
/// `referrer` / `user_agent` 为 `None` 时保留旧值，`device` 总是覆盖。
#[derive(Debug, Clone)]
pub struct PathRecordUpdate {
    pub viewed_at: DateTime<Utc>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub device: DeviceDescriptor,
}

impl From<NewPathRecord> for PathRecordUpdate {
    fn from(record: NewPathRecord) -> Self {
        Self {
            viewed_at: record.viewed_at,
            referrer: record.referrer,
            user_agent: record.user_agent,
            device: record.device,
        }
    }
}
