//! BlogPulse - page-view analytics for a headless-CMS blog
//!
//! 服务端按 path 累计浏览次数，并同步文章的 view_count；
//! 客户端门控（停留时间、会话去重、爬虫过滤）决定一次挂载是否上报。
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `analytics`: 设备分类、浏览事件与客户端门控
//! - `services`: 记录器与统计聚合
//! - `storage`: 存储接口与 SeaORM 后端
//! - `api`: HTTP 接口
//! - `interfaces`: CLI
//! - `config`: 配置加载
//! - `runtime`: 启动、关闭与运行模式
//! - `system`: 日志

pub mod analytics;
#[cfg(feature = "server")]
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
