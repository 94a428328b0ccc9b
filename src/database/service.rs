//! RPC 过程实现
//!
//! 每个过程都是一个 axum 处理函数，参数来自 JSON 请求体，
//! 返回统一信封。按调用方划分为管理后台、POS、数字菜单与导出四组。

pub mod admin;
pub mod digital_menu;
pub mod exports;
pub mod pos;

use axum::http::HeaderMap;
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::database::repository::accounts_repository::AccountsRepository;
use crate::database::repository::admin_repository::{AdminRepository, ORDER_EDIT_MODE_KEY};
use crate::database::repository::orders_repository::OrdersRepository;
use crate::entity::setting_metadata::SettingMetadata;
use crate::error::{AppError, AppResult};
use crate::reports::{OrderRecord, ReportClock};
use crate::session::{Principal, authorize_account};
use crate::state::AppState;

/// 未配置时的订单修改时限（分钟）
pub const DEFAULT_EDIT_MINUTES: i64 = 30;

const SECONDS_PER_MINUTE: i64 = 60;

// ==================== 订单修改策略 ====================

/// 订单修改模式，对应管理员设置 `order_edit_mode`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Off,
    Unlimited,
    TimeLimited { minutes: i64 },
}

/// `can_edit_order` 的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDecision {
    pub can_edit: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_remaining: Option<i64>,
}

impl EditMode {
    /// 解析设置值；`time_limited` 要求元数据中 `minutes` ≥ 1
    pub fn parse(value: &str, metadata: Option<&SettingMetadata>) -> AppResult<Self> {
        match value {
            "off" => Ok(EditMode::Off),
            "unlimited" => Ok(EditMode::Unlimited),
            "time_limited" => match metadata.and_then(|m| m.get_i64("minutes")) {
                Some(minutes) if minutes >= 1 => Ok(EditMode::TimeLimited { minutes }),
                _ => Err(AppError::validation(
                    "Time limit must be at least 1 minute",
                )),
            },
            _ => Err(AppError::validation(
                "Order edit mode must be one of: off, unlimited, time_limited",
            )),
        }
    }

    /// 读取当前设置，缺失或损坏时使用默认时限
    pub async fn load(db: &DatabaseConnection) -> AppResult<Self> {
        let fallback = EditMode::TimeLimited {
            minutes: DEFAULT_EDIT_MINUTES,
        };
        let Some(setting) = AdminRepository::find_setting(db, ORDER_EDIT_MODE_KEY).await? else {
            return Ok(fallback);
        };

        match Self::parse(&setting.setting_value, setting.setting_metadata.as_ref()) {
            Ok(mode) => Ok(mode),
            Err(e) => {
                log::warn!("订单修改设置无效，使用默认值: {}", e);
                Ok(fallback)
            }
        }
    }

    /// 判断创建于 `created_at` 的订单在 `now` 时能否修改
    pub fn decide(&self, created_at: i64, now: i64) -> EditDecision {
        match *self {
            EditMode::Off => EditDecision {
                can_edit: false,
                reason: "Order editing is disabled".to_string(),
                minutes_remaining: None,
            },
            EditMode::Unlimited => EditDecision {
                can_edit: true,
                reason: "Order editing is allowed".to_string(),
                minutes_remaining: None,
            },
            EditMode::TimeLimited { minutes } => {
                let remaining = created_at + minutes * SECONDS_PER_MINUTE - now;
                if remaining > 0 {
                    let left = (remaining + SECONDS_PER_MINUTE - 1) / SECONDS_PER_MINUTE;
                    EditDecision {
                        can_edit: true,
                        reason: format!("Order can be edited for {} more minute(s)", left),
                        minutes_remaining: Some(left),
                    }
                } else {
                    EditDecision {
                        can_edit: false,
                        reason: format!("Edit window of {} minutes has expired", minutes),
                        minutes_remaining: Some(0),
                    }
                }
            }
        }
    }
}

// ==================== 公共辅助 ====================

/// 校验账户范围的访问权限；管理员访问时还要确认账户存在
pub(crate) async fn authorize_existing(
    state: &AppState,
    headers: &HeaderMap,
    account_id: &str,
) -> AppResult<Principal> {
    let principal = authorize_account(state, headers, account_id)?;
    if principal.is_admin() && !AccountsRepository::exists(&state.db, account_id).await? {
        return Err(AppError::rejected("Account not found"));
    }
    Ok(principal)
}

// ==================== 报表数据 ====================

/// 读取 [start, end] 本地日期内的订单，转换为报表视图
pub(crate) async fn load_records(
    db: &DatabaseConnection,
    clock: ReportClock,
    account_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<OrderRecord>> {
    let (from, to) = clock.range_bounds(start, end);
    let orders = OrdersRepository::list_between(db, account_id, from, to).await?;

    Ok(orders
        .iter()
        .filter_map(|order| {
            let record = order.to_record();
            if record.is_none() {
                log::warn!(
                    "订单 {} 的支付方式无法识别: {}",
                    order.order.order_number,
                    order.order.payment_method
                );
            }
            record
        })
        .collect())
}

/// 分页参数：缺省值与上限
pub(crate) fn page_limit(limit: Option<u64>, default: u64, max: u64) -> u64 {
    limit.unwrap_or(default).clamp(1, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_mode_parsing() {
        assert_eq!(EditMode::parse("off", None).unwrap(), EditMode::Off);
        assert_eq!(EditMode::parse("unlimited", None).unwrap(), EditMode::Unlimited);

        let meta = SettingMetadata::with_i64("minutes", 15);
        assert_eq!(
            EditMode::parse("time_limited", Some(&meta)).unwrap(),
            EditMode::TimeLimited { minutes: 15 }
        );

        let zero = SettingMetadata::with_i64("minutes", 0);
        assert!(EditMode::parse("time_limited", Some(&zero)).is_err());
        assert!(EditMode::parse("time_limited", None).is_err());
        assert!(EditMode::parse("sometimes", None).is_err());
    }

    #[test]
    fn off_never_allows_edits() {
        let decision = EditMode::Off.decide(1_000, 1_001);
        assert!(!decision.can_edit);
        assert_eq!(decision.minutes_remaining, None);
    }

    #[test]
    fn unlimited_always_allows_edits() {
        let decision = EditMode::Unlimited.decide(0, 10 * 365 * 86_400);
        assert!(decision.can_edit);
    }

    #[test]
    fn time_limited_counts_down_in_whole_minutes() {
        let mode = EditMode::TimeLimited { minutes: 30 };
        let created = 1_700_000_000;

        let fresh = mode.decide(created, created + 60);
        assert!(fresh.can_edit);
        assert_eq!(fresh.minutes_remaining, Some(29));

        let partial = mode.decide(created, created + 29 * 60 + 1);
        assert!(partial.can_edit);
        assert_eq!(partial.minutes_remaining, Some(1));

        let expired = mode.decide(created, created + 30 * 60);
        assert!(!expired.can_edit);
        assert_eq!(expired.minutes_remaining, Some(0));
    }

    #[test]
    fn page_limit_applies_default_and_bounds() {
        assert_eq!(page_limit(None, 50, 500), 50);
        assert_eq!(page_limit(Some(0), 50, 500), 1);
        assert_eq!(page_limit(Some(10_000), 50, 500), 500);
    }
}
