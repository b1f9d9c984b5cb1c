use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::{RouteSettings, StaticConfig};
use crate::services::AnalyticsService;
use crate::storage::{AnalyticsStore, SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub analytics_service: Arc<AnalyticsService>,
    pub route_config: RouteSettings,
}

impl StartupContext {
    pub fn store(&self) -> Arc<dyn AnalyticsStore> {
        self.storage.clone()
    }
}

/// 连接存储（含迁移）并组装记录器
///
/// server 和需要数据库的 CLI 命令共用。
pub async fn open_analytics(config: &StaticConfig) -> Result<StartupContext> {
    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.backend_name().to_uppercase()
    );

    let store: Arc<dyn AnalyticsStore> = storage.clone();
    let analytics_service = Arc::new(AnalyticsService::new(store, &config.analytics));

    Ok(StartupContext {
        storage,
        analytics_service,
        route_config: config.routes.clone(),
    })
}

/// 准备服务器启动的上下文
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let context = open_analytics(config).await?;

    info!(
        "Routes: api at {}, health at {}",
        context.route_config.api_prefix, context.route_config.health_prefix
    );
    debug!("Pre-startup completed in {:?}", start_time.elapsed());
    Ok(context)
}
