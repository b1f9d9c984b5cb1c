//! CLI command implementations

mod classify;
mod config_gen;
mod page_views;

pub use classify::*;
pub use config_gen::*;
pub use page_views::*;
