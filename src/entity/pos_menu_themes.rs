//! 菜单主题实体
//!
//! 每个账户对每个主题最多一行，同一时间只有一行 active。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::custom_colors::CustomColors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pos_menu_themes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub pos_account_id: String,
    #[sea_orm(column_type = "Text")]
    pub theme_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub custom_colors: Option<CustomColors>,
    pub active: bool,
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
}

impl Related<super::pos_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PosAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
