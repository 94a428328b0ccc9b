//! 订单实体

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pos_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub pos_account_id: String,
    /// 账户内唯一，形如 ORD-20250601-0001
    #[sea_orm(column_type = "Text")]
    pub order_number: String,
    /// cash / upi / card
    #[sea_orm(column_type = "Text")]
    pub payment_method: String,
    #[sea_orm(column_type = "Double")]
    pub total_amount: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pos_accounts::Entity",
        from = "Column::PosAccountId",
        to = "super::pos_accounts::Column::Id",
        on_delete = "Cascade"
    )]
    PosAccounts,
    #[sea_orm(has_many = "super::pos_order_items::Entity")]
    PosOrderItems,
}

impl Related<super::pos_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PosAccounts.def()
    }
}

impl Related<super::pos_order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PosOrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
