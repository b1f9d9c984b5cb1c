pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20250301_000001_posts;
mod m20250301_000002_page_analytics;
mod m20250315_000001_page_views_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_posts::Migration),
            Box::new(m20250301_000002_page_analytics::Migration),
            Box::new(m20250315_000001_page_views_index::Migration),
        ]
    }
}
