use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 analytics 表，每个 path 一行
        manager
            .create_table(
                Table::create()
                    .table(Analytics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Analytics::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // 768 字符 × utf8mb4 = 3072 字节，InnoDB 唯一索引键上限
                    .col(
                        ColumnDef::new(Analytics::Path)
                            .string_len(768)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Analytics::PageViews)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Analytics::LastViewed)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Analytics::Referrer).text().null())
                    .col(ColumnDef::new(Analytics::UserAgent).text().null())
                    .col(
                        ColumnDef::new(Analytics::DeviceType)
                            .string_len(16)
                            .not_null()
                            .default("desktop"),
                    )
                    .col(
                        ColumnDef::new(Analytics::DeviceBrowser)
                            .string_len(32)
                            .not_null()
                            .default("Unknown"),
                    )
                    .col(
                        ColumnDef::new(Analytics::DeviceOs)
                            .string_len(32)
                            .not_null()
                            .default("Unknown"),
                    )
                    .col(
                        ColumnDef::new(Analytics::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Analytics::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // path 唯一索引：保证每个 path 至多一条记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_path")
                    .table(Analytics::Table)
                    .col(Analytics::Path)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_analytics_path").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Analytics::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Analytics {
    Table,
    Id,
    Path,
    PageViews,
    LastViewed,
    Referrer,
    UserAgent,
    DeviceType,
    DeviceBrowser,
    DeviceOs,
    CreatedAt,
    UpdatedAt,
}
