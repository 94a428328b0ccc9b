//! 授权订阅实体
//!
//! 一个账户可以有多条订阅记录，以最新一条为准。

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pos_subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub pos_account_id: String,
    #[sea_orm(column_type = "Text")]
    pub status: String,
    pub valid_from: i64,
    pub valid_until: i64,
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

impl Model {
    /// 授权在给定时间点是否仍有效
    pub fn is_valid_at(&self, now: i64) -> bool {
        self.valid_until > now
    }
}

pub const STATUS_ACTIVE: &str = "active";
