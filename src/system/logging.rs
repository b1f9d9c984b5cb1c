//! Logging system initialization

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;

use crate::config::LoggingConfig;
use crate::errors::{BlogPulseError, Result};

const DEFAULT_LOG_FILE_NAME: &str = "blogpulse.log";

type BoxedWriter = Box<dyn std::io::Write + Send + Sync>;

/// 根据配置选择日志输出：控制台、追加文件或按天滚动的文件
fn build_writer(config: &LoggingConfig) -> Result<BoxedWriter> {
    let log_file = match config.file.as_deref() {
        Some(f) if !f.is_empty() => f,
        _ => return Ok(Box::new(std::io::stdout())),
    };

    if !config.enable_rotation {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;
        return Ok(Box::new(file));
    }

    let path = Path::new(log_file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let filename = path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or(DEFAULT_LOG_FILE_NAME);

    let appender = rolling::Builder::new()
        .rotation(rolling::Rotation::DAILY)
        .filename_prefix(filename.trim_end_matches(".log"))
        .filename_suffix("log")
        .max_log_files(config.max_backups.max(1) as usize)
        .build(dir)
        .map_err(|e| BlogPulseError::file_operation(format!("无法创建滚动日志: {}", e)))?;
    Ok(Box::new(appender))
}

/// 初始化 tracing
///
/// 返回的 `WorkerGuard` 必须存活到程序退出，否则缓冲中的日志会丢失。
/// 全局 subscriber 已存在时（例如测试里重复调用）不会覆盖。
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let writer = build_writer(config)?;
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);

    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| BlogPulseError::config(format!("无效的日志级别 '{}': {}", config.level, e)))?;

    let to_console = config.file.as_deref().is_none_or(|f| f.is_empty());
    let builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(to_console);

    let installed = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = installed {
        eprintln!("[WARN] Logging already initialized: {}", e);
    }

    Ok(guard)
}
