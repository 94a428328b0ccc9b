//! 菜品分类实体

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pos_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub pos_account_id: String,
    #[sea_orm(column_type = "Text")]
    pub name: String,
    pub sort_order: i32,
    pub created_at: i64,
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
}

impl Related<super::pos_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PosAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
