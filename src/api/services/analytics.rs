//! 浏览上报与统计接口
//!
//! - POST /track - 上报一次页面浏览
//! - GET  /stats - 热门页面统计

use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{debug, trace};

use crate::analytics::{MAX_PATH_LEN, PageView, is_trackable_path};
use crate::api::error_code::ErrorCode;
use crate::api::helpers::{accepted_response, error_response, success_response};
use crate::api::types::TrackRequest;
use crate::services::AnalyticsService;

fn header_value(req: &HttpRequest, name: header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

pub struct AnalyticsApi;

impl AnalyticsApi {
    /// 上报浏览
    ///
    /// path 合法时总是返回 202，记录失败只写服务端日志。
    pub async fn track(
        req: HttpRequest,
        body: web::Json<TrackRequest>,
        service: web::Data<Arc<AnalyticsService>>,
    ) -> impl Responder {
        let body = body.into_inner();
        trace!("Received track request for {}", body.path);

        if !is_trackable_path(&body.path) {
            debug!("Rejected track request with invalid path: {:?}", body.path);
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorCode::AnalyticsInvalidPath,
                &format!(
                    "path must start with '/' and be at most {} characters",
                    MAX_PATH_LEN
                ),
            );
        }

        let referrer = body
            .referrer
            .or_else(|| header_value(&req, header::REFERER));
        let user_agent = body
            .user_agent
            .or_else(|| header_value(&req, header::USER_AGENT));

        service
            .record_page_view(PageView::new(body.path, referrer, user_agent))
            .await;

        accepted_response()
    }

    pub async fn stats(service: web::Data<Arc<AnalyticsService>>) -> HttpResponse {
        trace!("Received stats request");
        success_response(service.get_analytics_stats().await)
    }
}

/// Analytics 路由配置
pub fn analytics_routes() -> actix_web::Scope {
    web::scope("")
        .route("/track", web::post().to(AnalyticsApi::track))
        .route("/stats", web::get().to(AnalyticsApi::stats))
        .route("/stats", web::head().to(AnalyticsApi::stats))
}
