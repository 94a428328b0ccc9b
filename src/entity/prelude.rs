//! 预导入模块
//!
//! 提供常用类型的快捷导入。

// === SeaORM 实体 ===
pub use super::admin_settings::Entity as AdminSettings;
pub use super::admin_users::Entity as AdminUsers;
pub use super::pos_accounts::Entity as PosAccounts;
pub use super::pos_categories::Entity as PosCategories;
pub use super::pos_digital_menus::Entity as PosDigitalMenus;
pub use super::pos_menu_items::Entity as PosMenuItems;
pub use super::pos_menu_themes::Entity as PosMenuThemes;
pub use super::pos_order_items::Entity as PosOrderItems;
pub use super::pos_orders::Entity as PosOrders;
pub use super::pos_settings::Entity as PosSettings;
pub use super::pos_subscriptions::Entity as PosSubscriptions;
pub use super::pos_telemetry::Entity as PosTelemetry;

// === JSON 数据结构 ===
pub use super::custom_colors::CustomColors;
pub use super::setting_metadata::SettingMetadata;
