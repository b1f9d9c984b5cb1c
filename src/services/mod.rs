//! Service layer
//!
//! HTTP API、CLI 和进程内 tracker 共用的业务逻辑。

mod analytics_service;

pub use analytics_service::*;
