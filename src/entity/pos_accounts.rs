//! POS 账户实体
//!
//! 每个餐厅一个账户，是所有租户数据的根。删除账户会级联删除其全部附属数据。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pos_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text", unique)]
    pub mobile_number: String,
    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text")]
    pub pin_hash: String,
    #[sea_orm(column_type = "Text")]
    pub restaurant_name: String,
    /// active / disabled
    #[sea_orm(column_type = "Text")]
    pub status: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::pos_settings::Entity")]
    PosSettings,
    #[sea_orm(has_many = "super::pos_subscriptions::Entity")]
    PosSubscriptions,
    #[sea_orm(has_one = "super::pos_telemetry::Entity")]
    PosTelemetry,
    #[sea_orm(has_many = "super::pos_orders::Entity")]
    PosOrders,
}

impl Related<super::pos_settings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PosSettings.def()
    }
}

impl Related<super::pos_subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PosSubscriptions.def()
    }
}

impl Related<super::pos_telemetry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PosTelemetry.def()
    }
}

impl Related<super::pos_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PosOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// 账户状态
pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_DISABLED: &str = "disabled";
