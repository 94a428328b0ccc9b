//! 订单明细实体
//!
//! 明细保存下单时的菜名和单价快照，菜品后续修改或删除不影响历史订单。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pos_order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub order_id: String,
    #[sea_orm(column_type = "Text")]
    pub item_name: String,
    pub quantity: i32,
    #[sea_orm(column_type = "Double")]
    pub unit_price: f64,
    #[sea_orm(column_type = "Double")]
    pub total_price: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pos_orders::Entity",
        from = "Column::OrderId",
        to = "super::pos_orders::Column::Id",
        on_delete = "Cascade"
    )]
    PosOrders,
}

impl Related<super::pos_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PosOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
