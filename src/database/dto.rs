//! 数据传输对象 (DTO)
//!
//! RPC 请求参数与仓库层输入结构。
//! 参数名同时接受带 `p_` 前缀的旧客户端写法，例如 `p_account_id`。

use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::setting_metadata::SettingMetadata;

/// 辅助函数：支持 Option<Option<T>> 的反序列化
/// 用于区分"未提供字段"和"显式设为 null"
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

// ==================== 通用参数 ====================

#[derive(Clone, Debug, Deserialize)]
pub struct AccountIdArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AccountDaysArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(default, alias = "p_days")]
    pub days: Option<i64>,
}

// ==================== 超级管理员 ====================

#[derive(Clone, Debug, Deserialize)]
pub struct AdminLoginArgs {
    #[serde(alias = "p_username")]
    pub username: String,
    #[serde(alias = "p_password")]
    pub password: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateAccountArgs {
    #[serde(alias = "p_mobile_number")]
    pub mobile_number: String,
    #[serde(alias = "p_pin")]
    pub pin: String,
    #[serde(alias = "p_restaurant_name")]
    pub restaurant_name: String,
    #[serde(default, alias = "p_license_duration_days")]
    pub license_duration_days: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchAccountsArgs {
    #[serde(default, alias = "p_search_term")]
    pub search_term: Option<String>,
    #[serde(default, alias = "p_status")]
    pub status: Option<String>,
    #[serde(default, alias = "p_limit")]
    pub limit: Option<u64>,
    #[serde(default, alias = "p_offset")]
    pub offset: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ExtendLicenseArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(alias = "p_days")]
    pub days: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AccountOrdersArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(default, alias = "p_limit")]
    pub limit: Option<u64>,
    #[serde(default, alias = "p_offset")]
    pub offset: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpsertAdminSettingArgs {
    #[serde(alias = "p_key")]
    pub key: String,
    #[serde(alias = "p_value")]
    pub value: String,
    #[serde(default, alias = "p_metadata")]
    pub metadata: Option<SettingMetadata>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SetLogLevelArgs {
    pub level: String,
}

// ==================== POS ====================

#[derive(Clone, Debug, Deserialize)]
pub struct PosLoginArgs {
    #[serde(alias = "p_mobile_number")]
    pub mobile_number: String,
    #[serde(alias = "p_pin")]
    pub pin: String,
}

/// 更新餐厅设置
///
/// 文本字段使用 Option<Option<T>>：未提供时保持原值，显式 null 时清空。
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpsertSettingsArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(alias = "p_restaurant_name")]
    pub restaurant_name: String,
    #[serde(default, alias = "p_address", deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[serde(default, alias = "p_phone", deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, alias = "p_email", deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
    #[serde(default, alias = "p_fssai_number", deserialize_with = "double_option")]
    pub fssai_number: Option<Option<String>>,
    #[serde(default, alias = "p_tax_rate")]
    pub tax_rate: Option<f64>,
    #[serde(default, alias = "p_gst_inclusive")]
    pub gst_inclusive: Option<bool>,
    #[serde(default, alias = "p_privacy_mode")]
    pub privacy_mode: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpsertCategoriesArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(alias = "p_categories")]
    pub categories: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpsertMenuItemArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(default, alias = "p_item_id")]
    pub item_id: Option<String>,
    #[serde(alias = "p_name")]
    pub name: String,
    #[serde(alias = "p_price")]
    pub price: f64,
    #[serde(alias = "p_category")]
    pub category: String,
    #[serde(default, alias = "p_image", deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MenuItemRefArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(alias = "p_item_id")]
    pub item_id: String,
}

/// 下单明细（客户端购物车中的一行）
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderItemInput {
    #[serde(alias = "name")]
    pub item_name: String,
    pub quantity: i32,
    #[serde(alias = "price")]
    pub unit_price: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreateOrderArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(alias = "p_items")]
    pub items: Vec<OrderItemInput>,
    #[serde(alias = "p_payment_method")]
    pub payment_method: String,
    #[serde(alias = "p_total_amount")]
    pub total_amount: f64,
    #[serde(default, alias = "p_order_number")]
    pub order_number: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TelemetryArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(alias = "p_order_total")]
    pub order_total: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GetOrdersArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(default, alias = "p_limit")]
    pub limit: Option<u64>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OrderRefArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(alias = "p_order_id")]
    pub order_id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpdatePaymentMethodArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(alias = "p_order_id")]
    pub order_id: String,
    #[serde(alias = "p_payment_method")]
    pub payment_method: String,
    #[serde(default, alias = "p_is_admin")]
    pub is_admin: Option<bool>,
}

// ==================== 数字菜单 ====================

#[derive(Clone, Debug, Deserialize)]
pub struct InitDigitalMenuArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(alias = "p_restaurant_name")]
    pub restaurant_name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UpdateThemeArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(alias = "p_theme_name")]
    pub theme_name: String,
    /// 原样接收，由服务层校验后再转换为 CustomColors
    #[serde(default, alias = "p_custom_colors")]
    pub custom_colors: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SetMenuActiveArgs {
    #[serde(alias = "p_account_id")]
    pub account_id: String,
    #[serde(alias = "p_is_active")]
    pub is_active: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PublicMenuArgs {
    #[serde(alias = "p_slug")]
    pub slug: String,
}

// ==================== 仓库层输入 ====================

/// 创建账户所需的数据（已校验、已哈希）
#[derive(Clone, Debug)]
pub struct NewAccount {
    pub mobile_number: String,
    pub pin_hash: String,
    pub restaurant_name: String,
    pub license_duration_days: i64,
}

/// 菜品写入数据（已校验）
#[derive(Clone, Debug)]
pub struct MenuItemData {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub image: Option<Option<String>>,
}

/// 订单写入数据（已校验）
#[derive(Clone, Debug)]
pub struct NewOrder {
    pub order_number: Option<String>,
    pub payment_method: String,
    pub total_amount: f64,
    pub items: Vec<OrderItemInput>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_prefixed_argument_names() {
        let args: AccountDaysArgs =
            serde_json::from_str(r#"{"p_account_id":"abc","p_days":7}"#).unwrap();
        assert_eq!(args.account_id, "abc");
        assert_eq!(args.days, Some(7));

        let args: AccountDaysArgs = serde_json::from_str(r#"{"account_id":"abc"}"#).unwrap();
        assert_eq!(args.days, None);
    }

    #[test]
    fn settings_distinguish_missing_and_null() {
        let args: UpsertSettingsArgs = serde_json::from_str(
            r#"{"account_id":"a","restaurant_name":"Cafe","address":null,"phone":"123"}"#,
        )
        .unwrap();
        assert_eq!(args.address, Some(None));
        assert_eq!(args.phone, Some(Some("123".to_string())));
        assert_eq!(args.email, None);
    }

    #[test]
    fn order_items_accept_cart_field_names() {
        let item: OrderItemInput =
            serde_json::from_str(r#"{"name":"Coca Cola","quantity":2,"price":60}"#).unwrap();
        assert_eq!(item.item_name, "Coca Cola");
        assert_eq!(item.unit_price, 60.0);
    }
}
