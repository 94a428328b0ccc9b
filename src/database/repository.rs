pub mod accounts_repository;
pub mod admin_repository;
pub mod categories_repository;
pub mod digital_menu_repository;
pub mod menu_repository;
pub mod orders_repository;
pub mod settings_repository;
