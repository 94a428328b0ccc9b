use std::collections::HashMap;

use crate::database::dto::NewAccount;
use crate::entity::prelude::*;
use crate::entity::{
    pos_accounts, pos_categories, pos_settings, pos_subscriptions, pos_telemetry,
};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::{Deserialize, Serialize};

/// 新账户的默认分类
pub const DEFAULT_CATEGORIES: [&str; 3] = ["Mains", "Beverages", "Desserts"];

/// 新账户的默认税率（百分比，含税）
pub const DEFAULT_TAX_RATE: f64 = 5.0;

const SECONDS_PER_DAY: i64 = 86_400;

/// POS 账户数据仓库
pub struct AccountsRepository;

/// 管理后台账户列表中的一行
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountOverview {
    pub id: String,
    pub mobile_number: String,
    pub restaurant_name: String,
    pub status: String,
    pub license_status: String,
    pub license_valid_until: Option<i64>,
    pub days_remaining: i64,
    pub total_orders: i64,
    pub total_revenue: f64,
    pub last_active: Option<i64>,
    pub created_at: i64,
}

impl AccountOverview {
    /// 搜索词匹配餐厅名或手机号（不区分大小写），状态匹配 active / disabled / expired
    pub fn matches(&self, term: Option<&str>, status: Option<&str>) -> bool {
        let term_ok = match term.map(str::trim).filter(|t| !t.is_empty()) {
            None => true,
            Some(t) => {
                let t = t.to_lowercase();
                self.restaurant_name.to_lowercase().contains(&t)
                    || self.mobile_number.contains(&t)
            }
        };

        let status_ok = match status.map(str::trim).filter(|s| !s.is_empty()) {
            None | Some("all") => true,
            Some("expired") => self.license_status == LICENSE_EXPIRED,
            Some(s) => self.status == s,
        };

        term_ok && status_ok
    }
}

pub const LICENSE_ACTIVE: &str = "active";
pub const LICENSE_EXPIRED: &str = "expired";

/// from 之后 days 天的时间戳，溢出时停在 i64::MAX
pub fn license_expiry(from: i64, days: i64) -> i64 {
    from.saturating_add(days.saturating_mul(SECONDS_PER_DAY))
}

/// 剩余天数向上取整，已过期为 0
pub fn days_remaining(valid_until: i64, now: i64) -> i64 {
    let remaining = valid_until.saturating_sub(now);
    if remaining <= 0 {
        0
    } else {
        remaining.saturating_add(SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
    }
}

impl AccountsRepository {
    // ==================== 账户 CRUD 操作 ====================

    /// 创建账户及其默认数据（设置、订阅、遥测、默认分类），在同一事务中完成
    pub async fn create_with_defaults(
        db: &DatabaseConnection,
        input: NewAccount,
        now: i64,
    ) -> Result<pos_accounts::Model, DbErr> {
        let txn = db.begin().await?;

        let account_id = uuid::Uuid::new_v4().to_string();

        let account = pos_accounts::ActiveModel {
            id: Set(account_id.clone()),
            mobile_number: Set(input.mobile_number),
            pin_hash: Set(input.pin_hash),
            restaurant_name: Set(input.restaurant_name.clone()),
            status: Set(pos_accounts::STATUS_ACTIVE.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        pos_settings::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            pos_account_id: Set(account_id.clone()),
            restaurant_name: Set(input.restaurant_name),
            address: Set(None),
            phone: Set(None),
            email: Set(None),
            fssai_number: Set(None),
            tax_rate: Set(DEFAULT_TAX_RATE),
            gst_inclusive: Set(true),
            privacy_mode: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        pos_subscriptions::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            pos_account_id: Set(account_id.clone()),
            status: Set(pos_subscriptions::STATUS_ACTIVE.to_string()),
            valid_from: Set(now),
            valid_until: Set(license_expiry(now, input.license_duration_days)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        pos_telemetry::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            pos_account_id: Set(account_id.clone()),
            total_orders: Set(0),
            total_revenue: Set(0.0),
            last_active: Set(None),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let categories = DEFAULT_CATEGORIES
            .iter()
            .enumerate()
            .map(|(order, name)| pos_categories::ActiveModel {
                id: Set(uuid::Uuid::new_v4().to_string()),
                pos_account_id: Set(account_id.clone()),
                name: Set(String::from(*name)),
                sort_order: Set(order as i32),
                created_at: Set(now),
            });
        PosCategories::insert_many(categories).exec(&txn).await?;

        txn.commit().await?;

        Ok(account)
    }

    /// 根据 ID 查询账户
    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: &str,
    ) -> Result<Option<pos_accounts::Model>, DbErr> {
        PosAccounts::find_by_id(id.to_string()).one(db).await
    }

    /// 根据手机号查询账户
    pub async fn find_by_mobile(
        db: &DatabaseConnection,
        mobile_number: &str,
    ) -> Result<Option<pos_accounts::Model>, DbErr> {
        PosAccounts::find()
            .filter(pos_accounts::Column::MobileNumber.eq(mobile_number))
            .one(db)
            .await
    }

    /// 检查账户是否存在
    pub async fn exists(db: &DatabaseConnection, id: &str) -> Result<bool, DbErr> {
        Ok(PosAccounts::find_by_id(id.to_string()).count(db).await? > 0)
    }

    /// 切换账户状态（active <-> disabled），返回新状态
    pub async fn toggle_status(
        db: &DatabaseConnection,
        id: &str,
        now: i64,
    ) -> Result<Option<String>, DbErr> {
        let Some(existing) = Self::find_by_id(db, id).await? else {
            return Ok(None);
        };

        let new_status = if existing.status == pos_accounts::STATUS_ACTIVE {
            pos_accounts::STATUS_DISABLED
        } else {
            pos_accounts::STATUS_ACTIVE
        };

        let mut active: pos_accounts::ActiveModel = existing.into();
        active.status = Set(new_status.to_string());
        active.updated_at = Set(now);
        active.update(db).await?;

        Ok(Some(new_status.to_string()))
    }

    // ==================== 列表与搜索 ====================

    /// 获取所有账户概览，按创建时间倒序
    pub async fn list_overviews(
        db: &DatabaseConnection,
        now: i64,
    ) -> Result<Vec<AccountOverview>, DbErr> {
        let accounts = PosAccounts::find()
            .order_by_desc(pos_accounts::Column::CreatedAt)
            .all(db)
            .await?;

        // 每个账户取有效期最晚的订阅
        let mut licenses: HashMap<String, i64> = HashMap::new();
        for sub in PosSubscriptions::find().all(db).await? {
            licenses
                .entry(sub.pos_account_id)
                .and_modify(|until| *until = (*until).max(sub.valid_until))
                .or_insert(sub.valid_until);
        }

        let telemetry: HashMap<String, pos_telemetry::Model> = PosTelemetry::find()
            .all(db)
            .await?
            .into_iter()
            .map(|t| (t.pos_account_id.clone(), t))
            .collect();

        Ok(accounts
            .into_iter()
            .map(|account| {
                let valid_until = licenses.get(&account.id).copied();
                let stats = telemetry.get(&account.id);
                let license_status = match valid_until {
                    Some(until) if until > now => LICENSE_ACTIVE,
                    _ => LICENSE_EXPIRED,
                };

                AccountOverview {
                    license_status: license_status.to_string(),
                    license_valid_until: valid_until,
                    days_remaining: valid_until.map_or(0, |until| days_remaining(until, now)),
                    total_orders: stats.map_or(0, |t| t.total_orders),
                    total_revenue: stats.map_or(0.0, |t| t.total_revenue),
                    last_active: stats.and_then(|t| t.last_active),
                    id: account.id,
                    mobile_number: account.mobile_number,
                    restaurant_name: account.restaurant_name,
                    status: account.status,
                    created_at: account.created_at,
                }
            })
            .collect())
    }

    /// 搜索账户，返回 (当前页, 匹配总数)
    pub async fn search(
        db: &DatabaseConnection,
        term: Option<&str>,
        status: Option<&str>,
        limit: u64,
        offset: u64,
        now: i64,
    ) -> Result<(Vec<AccountOverview>, u64), DbErr> {
        let matched: Vec<AccountOverview> = Self::list_overviews(db, now)
            .await?
            .into_iter()
            .filter(|row| row.matches(term, status))
            .collect();

        let total = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        Ok((page, total))
    }

    // ==================== 授权 ====================

    /// 获取有效期最晚的订阅
    pub async fn latest_subscription(
        db: &DatabaseConnection,
        account_id: &str,
    ) -> Result<Option<pos_subscriptions::Model>, DbErr> {
        PosSubscriptions::find()
            .filter(pos_subscriptions::Column::PosAccountId.eq(account_id))
            .order_by_desc(pos_subscriptions::Column::ValidUntil)
            .one(db)
            .await
    }

    /// 延长授权：从 max(now, valid_until) 起增加 days 天，返回新的 valid_until
    pub async fn extend_license(
        db: &DatabaseConnection,
        account_id: &str,
        days: i64,
        now: i64,
    ) -> Result<i64, DbErr> {
        match Self::latest_subscription(db, account_id).await? {
            Some(sub) => {
                let new_until = license_expiry(sub.valid_until.max(now), days);
                let mut active: pos_subscriptions::ActiveModel = sub.into();
                active.valid_until = Set(new_until);
                active.status = Set(pos_subscriptions::STATUS_ACTIVE.to_string());
                active.updated_at = Set(now);
                active.update(db).await?;
                Ok(new_until)
            }
            None => {
                let new_until = license_expiry(now, days);
                pos_subscriptions::ActiveModel {
                    id: Set(uuid::Uuid::new_v4().to_string()),
                    pos_account_id: Set(account_id.to_string()),
                    status: Set(pos_subscriptions::STATUS_ACTIVE.to_string()),
                    valid_from: Set(now),
                    valid_until: Set(new_until),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(db)
                .await?;
                Ok(new_until)
            }
        }
    }

    // ==================== 遥测 ====================

    /// 获取账户遥测数据
    pub async fn find_telemetry(
        db: &DatabaseConnection,
        account_id: &str,
    ) -> Result<Option<pos_telemetry::Model>, DbErr> {
        PosTelemetry::find()
            .filter(pos_telemetry::Column::PosAccountId.eq(account_id))
            .one(db)
            .await
    }

    /// 记录一笔订单：订单数加一、营收累加、刷新最后活跃时间
    ///
    /// 接受任意连接，可在下单事务中调用。遥测行不存在时创建。
    pub async fn record_order<C: ConnectionTrait>(
        conn: &C,
        account_id: &str,
        order_total: f64,
        now: i64,
    ) -> Result<pos_telemetry::Model, DbErr> {
        let existing = PosTelemetry::find()
            .filter(pos_telemetry::Column::PosAccountId.eq(account_id))
            .one(conn)
            .await?;

        match existing {
            Some(row) => {
                let total_orders = row.total_orders + 1;
                let total_revenue = crate::utils::validation::round_money(
                    row.total_revenue + order_total,
                );
                let mut active: pos_telemetry::ActiveModel = row.into();
                active.total_orders = Set(total_orders);
                active.total_revenue = Set(total_revenue);
                active.last_active = Set(Some(now));
                active.update(conn).await
            }
            None => {
                pos_telemetry::ActiveModel {
                    id: Set(uuid::Uuid::new_v4().to_string()),
                    pos_account_id: Set(account_id.to_string()),
                    total_orders: Set(1),
                    total_revenue: Set(order_total),
                    last_active: Set(Some(now)),
                    created_at: Set(now),
                }
                .insert(conn)
                .await
            }
        }
    }

    /// 刷新最后活跃时间（登录时调用）
    pub async fn touch_last_active(
        db: &DatabaseConnection,
        account_id: &str,
        now: i64,
    ) -> Result<(), DbErr> {
        PosTelemetry::update_many()
            .col_expr(pos_telemetry::Column::LastActive, Expr::value(now))
            .filter(pos_telemetry::Column::PosAccountId.eq(account_id))
            .exec(db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overview(name: &str, mobile: &str, status: &str, license: &str) -> AccountOverview {
        AccountOverview {
            id: "id".to_string(),
            mobile_number: mobile.to_string(),
            restaurant_name: name.to_string(),
            status: status.to_string(),
            license_status: license.to_string(),
            license_valid_until: None,
            days_remaining: 0,
            total_orders: 0,
            total_revenue: 0.0,
            last_active: None,
            created_at: 0,
        }
    }

    #[test]
    fn license_expiry_saturates() {
        assert_eq!(license_expiry(100, 2), 100 + 2 * SECONDS_PER_DAY);
        assert_eq!(license_expiry(0, i64::MAX / 2), i64::MAX);
        assert_eq!(license_expiry(i64::MAX - 1, 1), i64::MAX);
    }

    #[test]
    fn days_remaining_rounds_up_and_clamps() {
        assert_eq!(days_remaining(1_000, 2_000), 0);
        assert_eq!(days_remaining(2_000, 2_000), 0);
        assert_eq!(days_remaining(SECONDS_PER_DAY + 1, 0), 2);
        assert_eq!(days_remaining(SECONDS_PER_DAY * 30, 0), 30);
    }

    #[test]
    fn overview_matching() {
        let row = overview("Spice Garden", "9876543210", "active", LICENSE_EXPIRED);

        assert!(row.matches(None, None));
        assert!(row.matches(Some("spice"), None));
        assert!(row.matches(Some("6543"), Some("active")));
        assert!(row.matches(Some("  "), Some("expired")));
        assert!(!row.matches(Some("pizza"), None));
        assert!(!row.matches(None, Some("disabled")));
    }
}
