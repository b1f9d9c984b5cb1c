//! HTTP API
//!
//! 所有响应使用 `{ code, message, data }` 信封。

pub mod error_code;
pub mod helpers;
pub mod services;
pub mod types;

use actix_web::web;

use crate::config::RouteSettings;
use services::{analytics_routes, health_routes};

pub use error_code::ErrorCode;
pub use types::ApiResponse;

/// 按配置的前缀挂载 analytics 与 health 路由
///
/// 需要的 app_data：`Arc<AnalyticsService>`、`Arc<dyn AnalyticsStore>`、`AppStartTime`。
pub fn configure_routes(cfg: &mut web::ServiceConfig, routes: &RouteSettings) {
    cfg.service(web::scope(&routes.api_prefix).service(analytics_routes()))
        .service(web::scope(&routes.health_prefix).service(health_routes()));
}
