use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks. Falls back to defaults when nothing has been
/// initialized yet, so library users that never call `init_config` still get
/// a usable configuration.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .load_full()
}

/// Initialize the global configuration from `config.toml` + `BP__*` env vars
///
/// # Examples
/// ```no_run
/// use blogpulse::config::init_config;
/// init_config();
/// ```
pub fn init_config() {
    init_config_from(None);
}

/// Initialize the global configuration from an explicit TOML path
pub fn init_config_from(path: Option<&str>) {
    let loaded = StaticConfig::load(path);
    match CONFIG.get() {
        Some(existing) => existing.store(Arc::new(loaded)),
        None => {
            let _ = CONFIG.set(ArcSwap::from_pointee(loaded));
        }
    }
}

/// Replace the global configuration (tests and embedding callers)
pub fn set_config(config: StaticConfig) {
    CONFIG
        .get_or_init(|| ArcSwap::from_pointee(StaticConfig::default()))
        .store(Arc::new(config));
}
