pub mod page_analytics;
pub mod post;

pub use page_analytics::Entity as PageAnalyticsEntity;
pub use post::Entity as PostEntity;
