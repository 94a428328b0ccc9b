use crate::database::dto::UpsertSettingsArgs;
use crate::entity::pos_settings;
use crate::entity::prelude::*;
use sea_orm::*;

use super::accounts_repository::DEFAULT_TAX_RATE;

/// 餐厅设置仓库
pub struct SettingsRepository;

impl SettingsRepository {
    /// 获取账户的餐厅设置
    pub async fn find_by_account(
        db: &DatabaseConnection,
        account_id: &str,
    ) -> Result<Option<pos_settings::Model>, DbErr> {
        PosSettings::find()
            .filter(pos_settings::Column::PosAccountId.eq(account_id))
            .one(db)
            .await
    }

    /// 插入或更新餐厅设置
    ///
    /// 未提供的字段保持原值；首次创建时使用默认值（税率 5%，含税）。
    pub async fn upsert(
        db: &DatabaseConnection,
        patch: UpsertSettingsArgs,
        now: i64,
    ) -> Result<pos_settings::Model, DbErr> {
        let existing = Self::find_by_account(db, &patch.account_id).await?;

        let is_new = existing.is_none();
        let mut active: pos_settings::ActiveModel = match existing {
            Some(model) => model.into(),
            None => pos_settings::ActiveModel {
                id: Set(uuid::Uuid::new_v4().to_string()),
                pos_account_id: Set(patch.account_id.clone()),
                address: Set(None),
                phone: Set(None),
                email: Set(None),
                fssai_number: Set(None),
                tax_rate: Set(DEFAULT_TAX_RATE),
                gst_inclusive: Set(true),
                privacy_mode: Set(false),
                created_at: Set(now),
                ..Default::default()
            },
        };

        active.restaurant_name = Set(patch.restaurant_name);
        if let Some(address) = patch.address {
            active.address = Set(address);
        }
        if let Some(phone) = patch.phone {
            active.phone = Set(phone);
        }
        if let Some(email) = patch.email {
            active.email = Set(email);
        }
        if let Some(fssai) = patch.fssai_number {
            active.fssai_number = Set(fssai);
        }
        if let Some(rate) = patch.tax_rate {
            active.tax_rate = Set(rate);
        }
        if let Some(inclusive) = patch.gst_inclusive {
            active.gst_inclusive = Set(inclusive);
        }
        if let Some(privacy) = patch.privacy_mode {
            active.privacy_mode = Set(privacy);
        }
        active.updated_at = Set(now);

        if is_new {
            active.insert(db).await
        } else {
            active.update(db).await
        }
    }
}
