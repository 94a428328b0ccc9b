//! 超级管理员全局设置实体（键值对 + JSON 元数据）

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::setting_metadata::SettingMetadata;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text", unique)]
    pub setting_key: String,
    #[sea_orm(column_type = "Text")]
    pub setting_value: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub setting_metadata: Option<SettingMetadata>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
