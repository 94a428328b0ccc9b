//! 数据实体模块
//!
//! 包含所有 SeaORM 实体定义和 JSON 数据结构。

pub mod prelude;

// === JSON 数据结构（嵌入表中的 JSON 列）===
pub mod custom_colors;
pub mod setting_metadata;

// === SeaORM 实体（对应数据库表）===
pub mod admin_settings;
pub mod admin_users;
pub mod pos_accounts;
pub mod pos_categories;
pub mod pos_digital_menus;
pub mod pos_menu_items;
pub mod pos_menu_themes;
pub mod pos_order_items;
pub mod pos_orders;
pub mod pos_settings;
pub mod pos_subscriptions;
pub mod pos_telemetry;
