pub mod analytics;
pub mod health;

pub use analytics::{AnalyticsApi, analytics_routes};
pub use health::{AppStartTime, HealthService, health_routes};
