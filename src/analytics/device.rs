//! User-Agent 设备分类
//!
//! 纯函数的子串启发式，不追求精确识别：
//! 每组规则按固定顺序匹配，先命中者胜出。

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// 未识别的浏览器 / 操作系统
pub const UNKNOWN: &str = "Unknown";

/// 设备类型
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    #[default]
    Desktop,
    Tablet,
}

/// 从 User-Agent 推导出的设备描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub browser: String,
    pub os: String,
}

impl Default for DeviceDescriptor {
    fn default() -> Self {
        Self {
            device_type: DeviceType::Desktop,
            browser: UNKNOWN.to_string(),
            os: UNKNOWN.to_string(),
        }
    }
}

type Rule = (&'static [&'static str], &'static str);

const BROWSER_RULES: &[Rule] = &[
    (&["chrome"], "Chrome"),
    (&["firefox"], "Firefox"),
    (&["safari"], "Safari"),
    (&["edge"], "Edge"),
];

// iPhone/iPad UA 都带 "like Mac OS X"，iOS 必须排在 mac 之前
const OS_RULES: &[Rule] = &[
    (&["iphone", "ipad"], "iOS"),
    (&["windows"], "Windows"),
    (&["mac"], "macOS"),
    (&["linux"], "Linux"),
    (&["android"], "Android"),
];

const MOBILE_MARKERS: &[&str] = &["mobile", "android", "iphone"];
const TABLET_MARKERS: &[&str] = &["ipad", "tablet"];

#[inline]
fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn first_match(ua_lower: &str, rules: &[Rule]) -> &'static str {
    rules
        .iter()
        .find(|(needles, _)| contains_any(ua_lower, needles))
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN)
}

impl DeviceDescriptor {
    /// 分类一个 User-Agent 字符串；空串得到 `{desktop, Unknown, Unknown}`
    pub fn classify(user_agent: &str) -> Self {
        if user_agent.is_empty() {
            return Self::default();
        }

        let ua = user_agent.to_lowercase();

        let device_type = if contains_any(&ua, MOBILE_MARKERS) {
            DeviceType::Mobile
        } else if contains_any(&ua, TABLET_MARKERS) {
            DeviceType::Tablet
        } else {
            DeviceType::Desktop
        };

        Self {
            device_type,
            browser: first_match(&ua, BROWSER_RULES).to_string(),
            os: first_match(&ua, OS_RULES).to_string(),
        }
    }

    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        Self::classify(user_agent.unwrap_or_default())
    }
}
