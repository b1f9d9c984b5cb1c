//! 热门页面查询索引
//!
//! `get_analytics_stats` 按 page_views 倒序取前 N 条，
//! 没有索引时每次都要全表排序。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_page_views")
                    .table(Analytics::Table)
                    .col(Analytics::PageViews)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_analytics_page_views")
                    .table(Analytics::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Analytics {
    Table,
    PageViews,
}
