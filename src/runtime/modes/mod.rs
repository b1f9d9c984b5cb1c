//! Mode routing
//!
//! - Server mode（HTTP 服务，默认）
//! - CLI mode（一次性命令）

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "server")]
pub use server::run_server;

#[cfg(feature = "cli")]
pub use cli::run_cli;
