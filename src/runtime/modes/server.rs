//! Server mode
//!
//! 启动 HTTP 服务并挂载 analytics / health 路由。

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::http::{Method, header};
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::warn;

use crate::api::configure_routes;
use crate::api::services::AppStartTime;
use crate::config::{RouteSettings, StaticConfig};
use crate::runtime::lifetime;
use crate::storage::AnalyticsStore;

/// 上报请求体上限
const MAX_PAYLOAD_BYTES: usize = 16 * 1024;

/// 构建 CORS 中间件
///
/// `cors_allowed_origins` 为空时保持同源策略；`"*"` 允许任意来源。
fn build_cors_middleware(routes: &RouteSettings) -> Cors {
    let origins = &routes.cors_allowed_origins;
    if origins.is_empty() {
        return Cors::default();
    }

    let mut cors = if origins.iter().any(|o| o == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors = cors
        .allowed_methods([Method::GET, Method::POST, Method::HEAD])
        .allowed_header(header::CONTENT_TYPE)
        .max_age(3600);
    cors
}

fn validate_routes(routes: &RouteSettings) {
    if routes.api_prefix == routes.health_prefix {
        warn!(
            "api_prefix and health_prefix are both '{}'; health routes will shadow analytics routes",
            routes.api_prefix
        );
    }
    if routes.cors_allowed_origins.iter().any(|o| o == "*") {
        warn!("CORS allows any origin; any site can report page views");
    }
}

/// Run the HTTP server
///
/// **Note**: 调用前需要完成日志初始化
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let app_start_time = AppStartTime::now();

    let startup = lifetime::startup::prepare_server_startup(config)
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {}", e))?;

    let store: Arc<dyn AnalyticsStore> = startup.store();
    let analytics_service = startup.analytics_service.clone();
    let routes = startup.route_config.clone();
    validate_routes(&routes);

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let db_for_shutdown = startup.storage.get_db().clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(build_cors_middleware(&routes))
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .app_data(web::Data::new(analytics_service.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::JsonConfig::default().limit(MAX_PAYLOAD_BYTES))
            .configure(|cfg| configure_routes(cfg, &routes))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown completed");
        }
    }

    Ok(())
}
