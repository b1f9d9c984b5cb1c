//! 客户端浏览门控
//!
//! 每次页面挂载决定是否上报一次浏览，防止计数被刷：
//! - 停留时间不足 `min_time_on_page` 的跳出不计
//! - 同一会话内 `dedup_window`（默认 30 分钟）内重复访问同一 path 不计
//! - 疑似爬虫的 User-Agent 不计
//!
//! 状态流转：`Idle → Pending → {Tracked | Suppressed}`，
//! 计时器触发前卸载或切换 path 则进入 `Cancelled`，之后重新挂载可以再次计时。
//!
//! 计时器是 tokio 任务，`mount` 必须在 tokio runtime 内调用。

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::{PageView, PageViewSink, non_empty};
use crate::config::{TrackerSettings, default_bot_patterns};

/// 会话存储中标记"已计数"的 key 前缀
pub const SESSION_KEY_PREFIX: &str = "viewed_";

/// 简单模式的固定延迟
const SIMPLE_TRACK_DELAY: Duration = Duration::from_millis(100);

pub fn session_key(path: &str) -> String {
    format!("{}{}", SESSION_KEY_PREFIX, path)
}

/// 会话级 key/value 存储（对应浏览器的 sessionStorage）
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: String);
}

/// 内存版会话存储，生命周期等同于一个浏览器标签页
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    items: DashMap<String, String>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).map(|v| v.value().clone())
    }

    fn set_item(&self, key: &str, value: String) {
        self.items.insert(key.to_string(), value);
    }
}

/// 门控参数
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub enabled: bool,
    /// 计数前需要停留的时间
    pub min_time_on_page: Duration,
    /// 会话去重窗口；`None` 表示不去重，也不写会话存储
    pub dedup_window: Option<Duration>,
    /// 小写子串匹配；为空表示不过滤爬虫
    pub bot_patterns: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_time_on_page: Duration::from_secs(5),
            dedup_window: Some(Duration::from_secs(30 * 60)),
            bot_patterns: default_bot_patterns(),
        }
    }
}

impl TrackerConfig {
    /// 简单模式：挂载后约 100ms 无条件上报，不去重、不过滤爬虫
    pub fn simple() -> Self {
        Self {
            enabled: true,
            min_time_on_page: SIMPLE_TRACK_DELAY,
            dedup_window: None,
            bot_patterns: Vec::new(),
        }
    }

    pub fn from_settings(settings: &TrackerSettings) -> Self {
        Self {
            enabled: settings.enabled,
            min_time_on_page: settings.min_time_on_page(),
            dedup_window: Some(settings.dedup_window()),
            bot_patterns: settings
                .bot_patterns
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    pub fn is_bot(&self, user_agent: &str) -> bool {
        if self.bot_patterns.is_empty() {
            return false;
        }
        let ua = user_agent.to_lowercase();
        self.bot_patterns.iter().any(|p| ua.contains(p.as_str()))
    }
}

/// 挂载时由导航层提供的页面上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub path: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

impl PageContext {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            referrer: None,
            user_agent: None,
        }
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = non_empty(Some(referrer.into()));
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = non_empty(Some(user_agent.into()));
        self
    }

    fn to_page_view(&self) -> PageView {
        PageView::new(
            self.path.clone(),
            self.referrer.clone(),
            self.user_agent.clone(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    /// 未挂载计时器（tracking 关闭）
    Idle,
    /// 计时器已启动
    Pending,
    /// 已上报
    Tracked,
    /// 会话去重或爬虫过滤命中
    Suppressed,
    /// 计时器触发前被卸载
    Cancelled,
}

/// 浏览门控
#[derive(Clone)]
pub struct ViewTracker {
    config: Arc<TrackerConfig>,
    sink: Arc<dyn PageViewSink>,
    session: Arc<dyn SessionStorage>,
}

impl ViewTracker {
    pub fn new(
        config: TrackerConfig,
        sink: Arc<dyn PageViewSink>,
        session: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            sink,
            session,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// 页面挂载
    pub fn mount(&self, ctx: PageContext) -> TrackedMount {
        if !self.config.enabled {
            trace!("Tracking disabled, not arming timer for {}", ctx.path);
            return TrackedMount::settled_as(ctx.path, TrackState::Idle);
        }

        if self.recently_tracked(&ctx.path) {
            debug!("{} already counted in this session window", ctx.path);
            return TrackedMount::settled_as(ctx.path, TrackState::Suppressed);
        }

        let state = Arc::new(Mutex::new(TrackState::Pending));
        let timer = tokio::spawn(run_timer(
            state.clone(),
            self.config.clone(),
            self.sink.clone(),
            self.session.clone(),
            ctx.clone(),
        ));

        TrackedMount {
            path: ctx.path,
            state,
            timer: Some(timer),
        }
    }

    /// 重新渲染或导航
    ///
    /// path 未变时沿用当前挂载（已计数的挂载不会重复上报）；
    /// path 变化时卸载旧挂载并对新 path 重新挂载。
    pub fn navigate(&self, current: TrackedMount, ctx: PageContext) -> TrackedMount {
        if current.path == ctx.path {
            return current;
        }
        drop(current);
        self.mount(ctx)
    }

    fn recently_tracked(&self, path: &str) -> bool {
        let Some(window) = self.config.dedup_window else {
            return false;
        };
        let Some(raw) = self.session.get_item(&session_key(path)) else {
            return false;
        };
        // 无法解析的时间戳当作没有记录
        let Ok(viewed_at_ms) = raw.parse::<i64>() else {
            return false;
        };
        let elapsed_ms = Utc::now().timestamp_millis() - viewed_at_ms;
        elapsed_ms < window.as_millis() as i64
    }
}

async fn run_timer(
    state: Arc<Mutex<TrackState>>,
    config: Arc<TrackerConfig>,
    sink: Arc<dyn PageViewSink>,
    session: Arc<dyn SessionStorage>,
    ctx: PageContext,
) {
    tokio::time::sleep(config.min_time_on_page).await;

    let is_bot = config.is_bot(ctx.user_agent.as_deref().unwrap_or_default());
    {
        let mut guard = state.lock();
        if *guard != TrackState::Pending {
            return;
        }
        *guard = if is_bot {
            TrackState::Suppressed
        } else {
            TrackState::Tracked
        };
    }

    if is_bot {
        debug!("Bot user agent, skipping page view for {}", ctx.path);
        return;
    }

    let pending = sink.record_page_view(ctx.to_page_view());
    if config.dedup_window.is_some() {
        session.set_item(
            &session_key(&ctx.path),
            Utc::now().timestamp_millis().to_string(),
        );
    }
    pending.await;
    trace!("Page view tracked for {}", ctx.path);
}

/// 一次页面挂载
///
/// drop 即卸载：计时器尚未触发时取消，已触发的上报会继续完成。
pub struct TrackedMount {
    path: String,
    state: Arc<Mutex<TrackState>>,
    timer: Option<JoinHandle<()>>,
}

impl TrackedMount {
    fn settled_as(path: String, state: TrackState) -> Self {
        Self {
            path,
            state: Arc::new(Mutex::new(state)),
            timer: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> TrackState {
        *self.state.lock()
    }

    /// 等待计时器（及其触发的上报）结束
    pub async fn settled(&mut self) -> TrackState {
        if let Some(timer) = self.timer.take()
            && let Err(e) = timer.await
            && !e.is_cancelled()
        {
            warn!("Page view timer for {} failed: {}", self.path, e);
        }
        self.state()
    }

    /// 卸载并返回最终状态
    pub fn unmount(self) -> TrackState {
        let state = self.state.clone();
        drop(self);
        *state.lock()
    }
}

impl Drop for TrackedMount {
    fn drop(&mut self) {
        let mut guard = self.state.lock();
        if *guard == TrackState::Pending {
            *guard = TrackState::Cancelled;
            if let Some(timer) = self.timer.take() {
                timer.abort();
            }
        }
    }
}
