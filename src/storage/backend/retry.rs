//! 数据库写入重试
//!
//! 只对瞬时错误重试（连接获取失败、死锁、SQLite BUSY 等），
//! 唯一约束冲突之类的确定性错误立即返回。

use std::future::Future;
use std::time::Duration;

use rand::RngExt;
use sea_orm::DbErr;
use sea_orm::error::RuntimeErr;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// 判断数据库错误是否可重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_retryable_runtime_error(runtime_err)
        }
        _ => false,
    }
}

fn is_retryable_runtime_error(err: &RuntimeErr) -> bool {
    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(code) = sqlx_err
                .deref()
                .as_database_error()
                .and_then(|db_err| db_err.code())
            {
                return matches!(
                    code.as_ref(),
                    // MySQL 死锁 / 锁等待超时
                    "1213" | "1205" |
                    // PostgreSQL 序列化失败 / 死锁
                    "40001" | "40P01" |
                    // SQLite BUSY / LOCKED
                    "5" | "6"
                );
            }
            is_transient_message(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => is_transient_message(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn is_transient_message(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    ["deadlock", "lock wait timeout", "database is locked", "serialization failure"]
        .iter()
        .any(|needle| msg.contains(needle))
}

/// 重试配置
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// 首次失败后的最大重试次数
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::from(&DatabaseConfig::default())
    }
}

impl From<&DatabaseConfig> for RetryConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms.max(config.retry_base_delay_ms),
        }
    }
}

impl RetryConfig {
    /// 第 `attempt` 次重试前的等待时间：指数退避，封顶后加 0-25% 抖动
    fn backoff(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exp.min(self.max_delay_ms);
        let jitter = rand::rng().random_range(0..=capped / 4);
        Duration::from_millis(capped.saturating_add(jitter))
    }
}

/// 带指数退避的重试执行器
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut attempt = 0;
    loop {
        let err = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(
                        "Operation '{}' succeeded after {} retries",
                        operation_name, attempt
                    );
                }
                return Ok(value);
            }
            Err(e) => e,
        };

        if !is_retryable_error(&err) || attempt >= config.max_retries {
            return Err(err);
        }

        attempt += 1;
        let delay = config.backoff(attempt);
        warn!(
            "Operation '{}' failed (attempt {}/{}): {}; retrying in {:?}",
            operation_name,
            attempt,
            config.max_retries + 1,
            err,
            delay
        );
        sleep(delay).await;
    }
}
