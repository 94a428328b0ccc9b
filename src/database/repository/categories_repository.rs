use std::collections::{HashMap, HashSet};

use crate::entity::pos_categories;
use crate::entity::prelude::*;
use sea_orm::*;

/// 菜单分类仓库
pub struct CategoriesRepository;

/// 去除首尾空白、丢弃空名与重复名（保留首次出现的顺序）
pub fn normalize_category_names(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

impl CategoriesRepository {
    /// 获取账户的分类，按排序字段升序
    pub async fn list(
        db: &DatabaseConnection,
        account_id: &str,
    ) -> Result<Vec<pos_categories::Model>, DbErr> {
        PosCategories::find()
            .filter(pos_categories::Column::PosAccountId.eq(account_id))
            .order_by_asc(pos_categories::Column::SortOrder)
            .all(db)
            .await
    }

    /// 以新列表替换账户的分类
    ///
    /// 只做增量修改：删除不在新列表中的分类，插入新分类，
    /// 已存在的分类仅在位置变化时更新排序。
    pub async fn replace(
        db: &DatabaseConnection,
        account_id: &str,
        names: Vec<String>,
        now: i64,
    ) -> Result<Vec<pos_categories::Model>, DbErr> {
        let names = normalize_category_names(names);

        // 开启事务
        let txn = db.begin().await?;

        // 1. 获取当前分类
        let current = PosCategories::find()
            .filter(pos_categories::Column::PosAccountId.eq(account_id))
            .all(&txn)
            .await?;

        // name -> (id, sort_order)
        let mut current_map: HashMap<String, (String, i32)> = current
            .iter()
            .map(|c| (c.name.clone(), (c.id.clone(), c.sort_order)))
            .collect();

        let new_set: HashSet<&str> = names.iter().map(String::as_str).collect();

        // 2. 删除不在新列表中的分类
        let to_delete: Vec<String> = current
            .iter()
            .filter(|c| !new_set.contains(c.name.as_str()))
            .map(|c| c.id.clone())
            .collect();

        if !to_delete.is_empty() {
            PosCategories::delete_many()
                .filter(pos_categories::Column::Id.is_in(to_delete))
                .exec(&txn)
                .await?;
        }

        // 3. 计算新增与排序变更
        let mut to_insert = Vec::new();
        let mut to_update = Vec::new();

        for (new_order, name) in names.iter().enumerate() {
            let new_order = new_order as i32;

            if let Some((id, old_order)) = current_map.remove(name) {
                if old_order != new_order {
                    to_update.push((id, new_order));
                }
            } else {
                to_insert.push(pos_categories::ActiveModel {
                    id: Set(uuid::Uuid::new_v4().to_string()),
                    pos_account_id: Set(account_id.to_string()),
                    name: Set(name.clone()),
                    sort_order: Set(new_order),
                    created_at: Set(now),
                });
            }
        }

        // 4. 批量插入
        if !to_insert.is_empty() {
            PosCategories::insert_many(to_insert).exec(&txn).await?;
        }

        // 5. 批量更新排序（CASE WHEN，一条语句完成）
        if !to_update.is_empty() {
            let case_clause = to_update
                .iter()
                .map(|_| "WHEN ? THEN ?")
                .collect::<Vec<_>>()
                .join(" ");
            let placeholders = vec!["?"; to_update.len()].join(", ");

            let mut values: Vec<Value> = Vec::with_capacity(to_update.len() * 3);
            for (id, order) in &to_update {
                values.push(id.clone().into());
                values.push((*order).into());
            }
            for (id, _) in &to_update {
                values.push(id.clone().into());
            }

            let sql = format!(
                "UPDATE pos_categories SET sort_order = CASE id {} END WHERE id IN ({})",
                case_clause, placeholders
            );
            txn.execute(Statement::from_sql_and_values(
                DbBackend::Sqlite,
                sql,
                values,
            ))
            .await?;
        }

        // 提交事务
        txn.commit().await?;

        Self::list(db, account_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_dedups() {
        let names = vec![
            " Mains ".to_string(),
            "Beverages".to_string(),
            "".to_string(),
            "Mains".to_string(),
            "   ".to_string(),
            "Desserts".to_string(),
        ];
        assert_eq!(
            normalize_category_names(names),
            vec!["Mains", "Beverages", "Desserts"]
        );
    }
}
