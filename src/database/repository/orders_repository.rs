use std::collections::HashMap;

use crate::billing::PaymentMethod;
use crate::database::dto::NewOrder;
use crate::entity::prelude::*;
use crate::entity::{pos_order_items, pos_orders};
use crate::reports::{OrderLine, OrderRecord};
use crate::utils::validation::round_money;
use sea_orm::*;
use serde::Serialize;

use super::accounts_repository::AccountsRepository;

/// 订单数据仓库
pub struct OrdersRepository;

/// 订单及其明细
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: pos_orders::Model,
    pub items: Vec<pos_order_items::Model>,
}

impl OrderWithItems {
    /// 转换为报表视图，无法识别的支付方式返回 None
    pub fn to_record(&self) -> Option<OrderRecord> {
        let payment_method = self.order.payment_method.parse::<PaymentMethod>().ok()?;
        Some(OrderRecord {
            order_number: self.order.order_number.clone(),
            payment_method,
            total: self.order.total_amount,
            created_at: self.order.created_at,
            items: self
                .items
                .iter()
                .map(|item| OrderLine {
                    item_name: item.item_name.clone(),
                    quantity: i64::from(item.quantity),
                    unit_price: item.unit_price,
                    total_price: item.total_price,
                })
                .collect(),
        })
    }
}

/// 在已有订单号中找出该前缀下的最大序号并加一，格式 `{prefix}NNNN`
pub fn next_sequence_number<'a, I>(prefix: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let max = existing
        .into_iter()
        .filter_map(|number| number.strip_prefix(prefix))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{}{:04}", prefix, max + 1)
}

impl OrdersRepository {
    /// 创建订单、写入明细并更新遥测，在同一事务中完成
    ///
    /// `order_number` 为空时按 `number_prefix` 生成当天的下一个序号。
    /// 订单号已存在时返回 None。
    pub async fn create(
        db: &DatabaseConnection,
        account_id: &str,
        input: NewOrder,
        number_prefix: &str,
        now: i64,
    ) -> Result<Option<OrderWithItems>, DbErr> {
        let txn = db.begin().await?;

        let order_number = match input.order_number {
            Some(number) => {
                let taken = PosOrders::find()
                    .filter(pos_orders::Column::PosAccountId.eq(account_id))
                    .filter(pos_orders::Column::OrderNumber.eq(number.as_str()))
                    .count(&txn)
                    .await?
                    > 0;
                if taken {
                    txn.rollback().await?;
                    return Ok(None);
                }
                number
            }
            None => {
                let existing: Vec<String> = PosOrders::find()
                    .select_only()
                    .column(pos_orders::Column::OrderNumber)
                    .filter(pos_orders::Column::PosAccountId.eq(account_id))
                    .filter(pos_orders::Column::OrderNumber.starts_with(number_prefix))
                    .into_tuple()
                    .all(&txn)
                    .await?;
                next_sequence_number(number_prefix, existing.iter().map(String::as_str))
            }
        };

        let order_id = uuid::Uuid::new_v4().to_string();
        let order = pos_orders::ActiveModel {
            id: Set(order_id.clone()),
            pos_account_id: Set(account_id.to_string()),
            order_number: Set(order_number),
            payment_method: Set(input.payment_method),
            total_amount: Set(input.total_amount),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in input.items {
            let total_price = round_money(item.unit_price * f64::from(item.quantity));
            let row = pos_order_items::ActiveModel {
                id: Set(uuid::Uuid::new_v4().to_string()),
                order_id: Set(order_id.clone()),
                item_name: Set(item.item_name),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                total_price: Set(total_price),
            }
            .insert(&txn)
            .await?;
            items.push(row);
        }

        AccountsRepository::record_order(&txn, account_id, order.total_amount, now).await?;

        txn.commit().await?;

        Ok(Some(OrderWithItems { order, items }))
    }

    /// 为订单列表批量加载明细
    async fn attach_items(
        db: &DatabaseConnection,
        orders: Vec<pos_orders::Model>,
    ) -> Result<Vec<OrderWithItems>, DbErr> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
        let mut grouped: HashMap<String, Vec<pos_order_items::Model>> = HashMap::new();
        for item in PosOrderItems::find()
            .filter(pos_order_items::Column::OrderId.is_in(ids))
            .order_by_asc(pos_order_items::Column::ItemName)
            .all(db)
            .await?
        {
            grouped.entry(item.order_id.clone()).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = grouped.remove(&order.id).unwrap_or_default();
                OrderWithItems { order, items }
            })
            .collect())
    }

    /// 获取账户订单（含明细），按时间倒序分页
    pub async fn list_with_items(
        db: &DatabaseConnection,
        account_id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<OrderWithItems>, DbErr> {
        let orders = PosOrders::find()
            .filter(pos_orders::Column::PosAccountId.eq(account_id))
            .order_by_desc(pos_orders::Column::CreatedAt)
            .order_by_desc(pos_orders::Column::OrderNumber)
            .limit(limit)
            .offset(offset)
            .all(db)
            .await?;

        Self::attach_items(db, orders).await
    }

    /// 获取 [start, end) 时间范围内的订单（含明细），按时间升序
    pub async fn list_between(
        db: &DatabaseConnection,
        account_id: &str,
        start: i64,
        end: i64,
    ) -> Result<Vec<OrderWithItems>, DbErr> {
        let orders = PosOrders::find()
            .filter(pos_orders::Column::PosAccountId.eq(account_id))
            .filter(pos_orders::Column::CreatedAt.gte(start))
            .filter(pos_orders::Column::CreatedAt.lt(end))
            .order_by_asc(pos_orders::Column::CreatedAt)
            .all(db)
            .await?;

        Self::attach_items(db, orders).await
    }

    /// 账户订单总数
    pub async fn count(db: &DatabaseConnection, account_id: &str) -> Result<u64, DbErr> {
        PosOrders::find()
            .filter(pos_orders::Column::PosAccountId.eq(account_id))
            .count(db)
            .await
    }

    /// 查询属于该账户的订单（含明细）
    pub async fn find_owned(
        db: &DatabaseConnection,
        account_id: &str,
        order_id: &str,
    ) -> Result<Option<OrderWithItems>, DbErr> {
        let order = PosOrders::find_by_id(order_id.to_string())
            .filter(pos_orders::Column::PosAccountId.eq(account_id))
            .one(db)
            .await?;

        match order {
            Some(order) => Ok(Self::attach_items(db, vec![order]).await?.pop()),
            None => Ok(None),
        }
    }

    /// 修改订单的支付方式
    pub async fn update_payment_method(
        db: &DatabaseConnection,
        order: pos_orders::Model,
        payment_method: PaymentMethod,
        now: i64,
    ) -> Result<pos_orders::Model, DbErr> {
        let mut active: pos_orders::ActiveModel = order.into();
        active.payment_method = Set(payment_method.as_str().to_string());
        active.updated_at = Set(now);
        active.update(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_starts_at_one() {
        let none: [&str; 0] = [];
        assert_eq!(next_sequence_number("ORD-20250101-", none), "ORD-20250101-0001");
    }

    #[test]
    fn sequence_continues_from_max_of_same_prefix() {
        let existing = [
            "ORD-20250101-0001",
            "ORD-20250101-0007",
            "ORD-20241231-0042",
            "CUSTOM-1",
        ];
        assert_eq!(
            next_sequence_number("ORD-20250101-", existing),
            "ORD-20250101-0008"
        );
    }
}
