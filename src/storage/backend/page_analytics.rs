//! analytics 表：按 path 的浏览计数

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ExprTrait, QueryFilter, QueryOrder, QuerySelect,
};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::{model_to_path_record, new_path_to_active_model};
use super::retry;
use crate::errors::{BlogPulseError, Result};
use crate::storage::models::{NewPathRecord, PathAnalyticsRecord, PathRecordUpdate};

use migration::entities::page_analytics;

impl SeaOrmStorage {
    pub(super) async fn find_analytics_by_path(
        &self,
        path: &str,
    ) -> Result<Option<PathAnalyticsRecord>> {
        let db = &self.db;
        let model = retry::with_retry(
            &format!("find_path_record({})", path),
            self.retry_config,
            || async {
                page_analytics::Entity::find()
                    .filter(page_analytics::Column::Path.eq(path))
                    .one(db)
                    .await
            },
        )
        .await?;

        model.map(model_to_path_record).transpose()
    }

    /// 唯一约束冲突经 `From<DbErr>` 转为 `BlogPulseError::Conflict`
    pub(super) async fn insert_analytics(
        &self,
        record: NewPathRecord,
    ) -> Result<PathAnalyticsRecord> {
        let db = &self.db;
        let model = retry::with_retry(
            &format!("create_path_record({})", record.path),
            self.retry_config,
            || async { new_path_to_active_model(&record).insert(db).await },
        )
        .await?;

        debug!("Analytics record created for {}", model.path);
        model_to_path_record(model)
    }

    pub(super) async fn bump_analytics(&self, id: i64, update: PathRecordUpdate) -> Result<()> {
        let db = &self.db;
        let result = retry::with_retry(
            &format!("increment_path_record({})", id),
            self.retry_config,
            || async {
                let mut stmt = page_analytics::Entity::update_many()
                    .col_expr(
                        page_analytics::Column::PageViews,
                        Expr::col(page_analytics::Column::PageViews).add(1),
                    )
                    .col_expr(
                        page_analytics::Column::LastViewed,
                        Expr::val(update.viewed_at).into(),
                    )
                    .col_expr(
                        page_analytics::Column::UpdatedAt,
                        Expr::val(update.viewed_at).into(),
                    )
                    .col_expr(
                        page_analytics::Column::DeviceType,
                        Expr::val(update.device.device_type.to_string()).into(),
                    )
                    .col_expr(
                        page_analytics::Column::DeviceBrowser,
                        Expr::val(update.device.browser.clone()).into(),
                    )
                    .col_expr(
                        page_analytics::Column::DeviceOs,
                        Expr::val(update.device.os.clone()).into(),
                    );

                // 缺失的 referrer / user_agent 保留旧值
                if let Some(referrer) = &update.referrer {
                    stmt = stmt.col_expr(
                        page_analytics::Column::Referrer,
                        Expr::val(referrer.clone()).into(),
                    );
                }
                if let Some(user_agent) = &update.user_agent {
                    stmt = stmt.col_expr(
                        page_analytics::Column::UserAgent,
                        Expr::val(user_agent.clone()).into(),
                    );
                }

                stmt.filter(page_analytics::Column::Id.eq(id))
                    .exec(db)
                    .await
            },
        )
        .await?;

        if result.rows_affected == 0 {
            return Err(BlogPulseError::not_found(format!(
                "analytics 记录不存在: id={}",
                id
            )));
        }
        Ok(())
    }

    pub(super) async fn load_top_paths(&self, limit: u64) -> Result<Vec<PathAnalyticsRecord>> {
        let db = &self.db;
        let models = retry::with_retry("top_paths", self.retry_config, || async {
            page_analytics::Entity::find()
                .order_by_desc(page_analytics::Column::PageViews)
                .order_by_asc(page_analytics::Column::Path)
                .limit(limit)
                .all(db)
                .await
        })
        .await?;

        models.into_iter().map(model_to_path_record).collect()
    }
}
