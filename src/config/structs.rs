use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量
/// - database: 数据库连接配置
/// - logging: 日志配置
/// - analytics: 统计聚合配置
/// - tracker: 客户端浏览计数门控配置
/// - routes: HTTP 路由前缀与 CORS
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub tracker: TrackerSettings,
    #[serde(default)]
    pub routes: RouteSettings,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：BP，分隔符：__
    /// 示例：BP__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Self {
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        match Self::try_load(path) {
            Ok(config) => {
                if std::path::Path::new(path).exists() {
                    eprintln!("[INFO] Configuration loaded from: {}", path);
                }
                config
            }
            Err(e) => {
                eprintln!("[ERROR] Failed to load config: {}", e);
                Self::default()
            }
        }
    }

    /// 与 `load` 相同，但把解析错误返回给调用方
    pub fn try_load(path: &str) -> Result<Self> {
        use config::{Config, Environment, File};

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 BP，分隔符 __
            .add_source(
                Environment::with_prefix("BP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize::<StaticConfig>()?)
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    /// 连接/获取连接超时（秒）
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `text` 或 `json`
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 统计聚合配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// 热门页面返回条数，`total_views` 也只在这一批里求和
    #[serde(default = "default_top_pages_limit")]
    pub top_pages_limit: u64,
    /// 文章详情页前缀，`{prefix}{slug}` 命中时同步累加文章的 view_count
    #[serde(default = "default_blog_path_prefix")]
    pub blog_path_prefix: String,
}

/// 客户端门控配置（dwell time / 会话去重 / 爬虫过滤）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSettings {
    #[serde(default = "default_tracker_enabled")]
    pub enabled: bool,
    #[serde(default = "default_min_time_on_page_secs")]
    pub min_time_on_page_secs: u64,
    #[serde(default = "default_dedup_window_secs")]
    pub dedup_window_secs: u64,
    #[serde(default = "default_bot_patterns")]
    pub bot_patterns: Vec<String>,
}

impl TrackerSettings {
    pub fn min_time_on_page(&self) -> Duration {
        Duration::from_secs(self.min_time_on_page_secs)
    }

    pub fn dedup_window(&self) -> Duration {
        Duration::from_secs(self.dedup_window_secs)
    }
}

/// 路由配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSettings {
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_health_prefix")]
    pub health_prefix: String,
    /// 允许跨域上报的来源；为空时只接受同源请求
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

// ============================================================
// Default value functions
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite://blogpulse.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    8
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_top_pages_limit() -> u64 {
    10
}

fn default_blog_path_prefix() -> String {
    "/blog/".to_string()
}

fn default_tracker_enabled() -> bool {
    true
}

fn default_min_time_on_page_secs() -> u64 {
    5
}

fn default_dedup_window_secs() -> u64 {
    30 * 60
}

pub fn default_bot_patterns() -> Vec<String> {
    ["bot", "crawl", "spider", "slurp", "curl", "wget"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_api_prefix() -> String {
    "/api/analytics".to_string()
}

fn default_health_prefix() -> String {
    "/health".to_string()
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_pages_limit: default_top_pages_limit(),
            blog_path_prefix: default_blog_path_prefix(),
        }
    }
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            enabled: default_tracker_enabled(),
            min_time_on_page_secs: default_min_time_on_page_secs(),
            dedup_window_secs: default_dedup_window_secs(),
            bot_patterns: default_bot_patterns(),
        }
    }
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            api_prefix: default_api_prefix(),
            health_prefix: default_health_prefix(),
            cors_allowed_origins: Vec::new(),
        }
    }
}
