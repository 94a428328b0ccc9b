use crate::database::dto::MenuItemData;
use crate::entity::pos_menu_items;
use crate::entity::prelude::*;
use sea_orm::*;

/// 菜品数据仓库
pub struct MenuRepository;

impl MenuRepository {
    /// 获取账户的所有菜品，按分类、名称排序
    pub async fn list(
        db: &DatabaseConnection,
        account_id: &str,
    ) -> Result<Vec<pos_menu_items::Model>, DbErr> {
        PosMenuItems::find()
            .filter(pos_menu_items::Column::PosAccountId.eq(account_id))
            .order_by_asc(pos_menu_items::Column::Category)
            .order_by_asc(pos_menu_items::Column::Name)
            .all(db)
            .await
    }

    /// 查询属于该账户的菜品
    pub async fn find_owned(
        db: &DatabaseConnection,
        account_id: &str,
        item_id: &str,
    ) -> Result<Option<pos_menu_items::Model>, DbErr> {
        PosMenuItems::find_by_id(item_id.to_string())
            .filter(pos_menu_items::Column::PosAccountId.eq(account_id))
            .one(db)
            .await
    }

    /// 新增菜品
    pub async fn insert(
        db: &DatabaseConnection,
        account_id: &str,
        data: MenuItemData,
        now: i64,
    ) -> Result<pos_menu_items::Model, DbErr> {
        pos_menu_items::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            pos_account_id: Set(account_id.to_string()),
            name: Set(data.name),
            price: Set(data.price),
            category: Set(data.category),
            image: Set(data.image.flatten()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
    }

    /// 更新菜品（image 未提供时保持原值）
    pub async fn update(
        db: &DatabaseConnection,
        existing: pos_menu_items::Model,
        data: MenuItemData,
        now: i64,
    ) -> Result<pos_menu_items::Model, DbErr> {
        let mut active: pos_menu_items::ActiveModel = existing.into();

        active.name = Set(data.name);
        active.price = Set(data.price);
        active.category = Set(data.category);
        if let Some(image) = data.image {
            active.image = Set(image);
        }
        active.updated_at = Set(now);

        active.update(db).await
    }

    /// 删除属于该账户的菜品，返回删除行数
    pub async fn delete_owned(
        db: &DatabaseConnection,
        account_id: &str,
        item_id: &str,
    ) -> Result<u64, DbErr> {
        let result = PosMenuItems::delete_many()
            .filter(pos_menu_items::Column::Id.eq(item_id))
            .filter(pos_menu_items::Column::PosAccountId.eq(account_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
