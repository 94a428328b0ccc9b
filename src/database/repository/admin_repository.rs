use crate::entity::prelude::*;
use crate::entity::{admin_settings, admin_users};
use sea_orm::*;

/// 订单编辑策略的设置键
pub const ORDER_EDIT_MODE_KEY: &str = "order_edit_mode";

/// 超级管理员与全局设置仓库
pub struct AdminRepository;

impl AdminRepository {
    // ==================== 管理员用户 ====================

    /// 根据用户名查询管理员
    pub async fn find_user_by_username(
        db: &DatabaseConnection,
        username: &str,
    ) -> Result<Option<admin_users::Model>, DbErr> {
        AdminUsers::find()
            .filter(admin_users::Column::Username.eq(username))
            .one(db)
            .await
    }

    /// 管理员数量
    pub async fn count_users(db: &DatabaseConnection) -> Result<u64, DbErr> {
        AdminUsers::find().count(db).await
    }

    /// 创建管理员（密码需已哈希）
    pub async fn create_user(
        db: &DatabaseConnection,
        username: String,
        password_hash: String,
        now: i64,
    ) -> Result<admin_users::Model, DbErr> {
        admin_users::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            username: Set(username),
            password_hash: Set(password_hash),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
    }

    // ==================== 全局设置 ====================

    /// 获取所有设置，按键名排序
    pub async fn list_settings(
        db: &DatabaseConnection,
    ) -> Result<Vec<admin_settings::Model>, DbErr> {
        AdminSettings::find()
            .order_by_asc(admin_settings::Column::SettingKey)
            .all(db)
            .await
    }

    /// 根据键名查询设置
    pub async fn find_setting(
        db: &DatabaseConnection,
        key: &str,
    ) -> Result<Option<admin_settings::Model>, DbErr> {
        AdminSettings::find()
            .filter(admin_settings::Column::SettingKey.eq(key))
            .one(db)
            .await
    }

    /// 插入或更新设置
    pub async fn upsert_setting(
        db: &DatabaseConnection,
        key: &str,
        value: String,
        metadata: Option<SettingMetadata>,
        now: i64,
    ) -> Result<admin_settings::Model, DbErr> {
        match Self::find_setting(db, key).await? {
            Some(existing) => {
                let mut active: admin_settings::ActiveModel = existing.into();
                active.setting_value = Set(value);
                active.setting_metadata = Set(metadata);
                active.updated_at = Set(now);
                active.update(db).await
            }
            None => {
                admin_settings::ActiveModel {
                    id: Set(uuid::Uuid::new_v4().to_string()),
                    setting_key: Set(key.to_string()),
                    setting_value: Set(value),
                    setting_metadata: Set(metadata),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(db)
                .await
            }
        }
    }
}
