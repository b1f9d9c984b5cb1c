pub mod device;
pub mod sink;
pub mod tracker;

pub use device::{DeviceDescriptor, DeviceType};
pub use sink::PageViewSink;
pub use tracker::{
    MemorySessionStorage, PageContext, SessionStorage, TrackState, TrackedMount, TrackerConfig,
    ViewTracker,
};

use serde::{Deserialize, Serialize};

/// path 最大字符数，与 `analytics.path` 列宽一致
///
/// 768 × 4 字节（utf8mb4）= 3072，正好是 InnoDB 单个索引键的上限。
pub const MAX_PATH_LEN: usize = 768;

/// 可记录的 path：非空、以 `/` 开头、不超过 `MAX_PATH_LEN` 个字符
pub fn is_trackable_path(path: &str) -> bool {
    path.starts_with('/') && path.chars().count() <= MAX_PATH_LEN
}

/// 一次页面浏览事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    /// URL path，例如 `/blog/my-post`
    pub path: String,
    /// 来源页面 (document.referrer)
    #[serde(default)]
    pub referrer: Option<String>,
    /// 用户代理 (navigator.userAgent)
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl PageView {
    /// 创建页面浏览事件；空字符串的 referrer / user_agent 视为缺失
    pub fn new(
        path: impl Into<String>,
        referrer: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            referrer: non_empty(referrer),
            user_agent: non_empty(user_agent),
        }
    }

    /// 把空字符串字段折叠为 `None`（反序列化得到的事件需要再过一遍）
    pub fn normalized(self) -> Self {
        Self::new(self.path, self.referrer, self.user_agent)
    }
}

#[inline]
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
