//! 统一 API 错误码定义

use serde_repr::{Deserialize_repr, Serialize_repr};

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 6000-6099: Analytics 错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    ServiceUnavailable = 1030,

    // Analytics 错误 6000-6099
    AnalyticsInvalidPath = 6000,
}
