use super::PageView;

/// 页面浏览上报 Sink
///
/// 客户端门控（`ViewTracker`）与服务端聚合之间的接缝。
/// 实现方必须吞掉自身的错误：上报失败不能影响页面渲染。
#[async_trait::async_trait]
pub trait PageViewSink: Send + Sync {
    async fn record_page_view(&self, view: PageView);
}
