use std::str::FromStr;

use crate::analytics::{DeviceDescriptor, DeviceType};
use crate::errors::{BlogPulseError, Result};
use crate::storage::models::{NewPathRecord, PathAnalyticsRecord, PostRecord, PostStatus};
use migration::entities::{page_analytics, post};

/// 将 posts Model 转换为 PostRecord
pub fn model_to_post(model: post::Model) -> Result<PostRecord> {
    let status = PostStatus::from_str(&model.status).map_err(|_| {
        BlogPulseError::serialization(format!(
            "文章 {} 的 status 非法: {}",
            model.slug, model.status
        ))
    })?;

    Ok(PostRecord {
        id: model.id,
        slug: model.slug,
        title: model.title,
        status,
        view_count: model.view_count.max(0),
        last_viewed_at: model.last_viewed_at,
    })
}

/// 将 analytics Model 转换为 PathAnalyticsRecord
pub fn model_to_path_record(model: page_analytics::Model) -> Result<PathAnalyticsRecord> {
    let device_type = DeviceType::from_str(&model.device_type).map_err(|_| {
        BlogPulseError::serialization(format!(
            "路径 {} 的 device_type 非法: {}",
            model.path, model.device_type
        ))
    })?;

    Ok(PathAnalyticsRecord {
        id: model.id,
        path: model.path,
        page_views: model.page_views.max(0),
        last_viewed: model.last_viewed,
        referrer: model.referrer,
        user_agent: model.user_agent,
        device: DeviceDescriptor {
            device_type,
            browser: model.device_browser,
            os: model.device_os,
        },
    })
}

/// 首次浏览的 ActiveModel，`page_views` 从 1 开始
pub fn new_path_to_active_model(record: &NewPathRecord) -> page_analytics::ActiveModel {
    use sea_orm::ActiveValue::*;

    page_analytics::ActiveModel {
        id: NotSet,
        path: Set(record.path.clone()),
        page_views: Set(1),
        last_viewed: Set(record.viewed_at),
        referrer: Set(record.referrer.clone()),
        user_agent: Set(record.user_agent.clone()),
        device_type: Set(record.device.device_type.to_string()),
        device_browser: Set(record.device.browser.clone()),
        device_os: Set(record.device.os.clone()),
        created_at: Set(record.viewed_at),
        updated_at: Set(record.viewed_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::ActiveValue;

    fn analytics_model(device_type: &str) -> page_analytics::Model {
        let now = Utc::now();
        page_analytics::Model {
            id: 3,
            path: "/about".to_string(),
            page_views: 12,
            last_viewed: now,
            referrer: None,
            user_agent: Some("curl/8.0".to_string()),
            device_type: device_type.to_string(),
            device_browser: "Unknown".to_string(),
            device_os: "Unknown".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_model_to_path_record() {
        let record = model_to_path_record(analytics_model("tablet")).unwrap();
        assert_eq!(record.page_views, 12);
        assert_eq!(record.device.device_type, DeviceType::Tablet);
        assert_eq!(record.user_agent.as_deref(), Some("curl/8.0"));
    }

    #[test]
    fn test_invalid_device_type_is_rejected() {
        let err = model_to_path_record(analytics_model("toaster")).unwrap_err();
        assert_eq!(err.code(), "E009");
    }

    #[test]
    fn test_model_to_post_status() {
        let model = post::Model {
            id: 1,
            slug: "hello".to_string(),
            title: "Hello".to_string(),
            status: "draft".to_string(),
            view_count: 0,
            last_viewed_at: None,
            created_at: Utc::now(),
        };
        assert_eq!(model_to_post(model).unwrap().status, PostStatus::Draft);
    }

    #[test]
    fn test_new_path_active_model_starts_at_one() {
        let record = NewPathRecord {
            path: "/".to_string(),
            viewed_at: Utc::now(),
            referrer: Some("https://example.com/".to_string()),
            user_agent: None,
            device: DeviceDescriptor::default(),
        };
        let active = new_path_to_active_model(&record);
        assert_eq!(active.page_views, ActiveValue::Set(1));
        assert_eq!(active.device_type, ActiveValue::Set("desktop".to_string()));
        assert!(matches!(active.id, ActiveValue::NotSet));
    }
}
