//! posts 表：文章浏览计数

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ExprTrait, QueryFilter,
};
use tracing::debug;

use super::SeaOrmStorage;
use super::converters::model_to_post;
use super::retry;
use crate::errors::{BlogPulseError, Result};
use crate::storage::models::{NewPost, PostRecord, PostStatus};

use migration::entities::post;

impl SeaOrmStorage {
    pub(super) async fn find_published_post_by_slug(&self, slug: &str) -> Result<Option<PostRecord>> {
        let db = &self.db;
        let model = retry::with_retry(
            &format!("find_published_post({})", slug),
            self.retry_config,
            || async {
                post::Entity::find()
                    .filter(post::Column::Slug.eq(slug))
                    .filter(post::Column::Status.eq(PostStatus::Published.as_ref()))
                    .one(db)
                    .await
            },
        )
        .await?;

        model.map(model_to_post).transpose()
    }

    pub(super) async fn find_post_by_slug(&self, slug: &str) -> Result<Option<PostRecord>> {
        let model = post::Entity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await?;

        model.map(model_to_post).transpose()
    }

    /// 原子自增，避免并发浏览丢计数
    pub(super) async fn bump_post_view_count(
        &self,
        post_id: i64,
        viewed_at: DateTime<Utc>,
    ) -> Result<()> {
        let db = &self.db;
        let result = retry::with_retry(
            &format!("increment_post_views({})", post_id),
            self.retry_config,
            || async {
                post::Entity::update_many()
                    .col_expr(
                        post::Column::ViewCount,
                        Expr::col(post::Column::ViewCount).add(1),
                    )
                    .col_expr(post::Column::LastViewedAt, Expr::val(viewed_at).into())
                    .filter(post::Column::Id.eq(post_id))
                    .exec(db)
                    .await
            },
        )
        .await?;

        if result.rows_affected == 0 {
            return Err(BlogPulseError::not_found(format!(
                "文章不存在: id={}",
                post_id
            )));
        }

        debug!("Post {} view_count incremented", post_id);
        Ok(())
    }

    pub(super) async fn insert_post(&self, new_post: NewPost) -> Result<PostRecord> {
        let model = post::ActiveModel {
            slug: Set(new_post.slug),
            title: Set(new_post.title),
            status: Set(new_post.status.to_string()),
            view_count: Set(0),
            last_viewed_at: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;

        model_to_post(model)
    }
}
