//! 基线数据库结构
//!
//! 创建 POS 账户及其所有附属表。所有账户附属数据通过外键
//! `ON DELETE CASCADE` 挂在 pos_accounts 上，删除账户即清理全部数据。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. 账户与超级管理员
        manager
            .create_table(
                Table::create()
                    .table(PosAccounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PosAccounts::Id).text().not_null().primary_key())
                    .col(
                        ColumnDef::new(PosAccounts::MobileNumber)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PosAccounts::PinHash).text().not_null())
                    .col(ColumnDef::new(PosAccounts::RestaurantName).text().not_null())
                    .col(
                        ColumnDef::new(PosAccounts::Status)
                            .text()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(PosAccounts::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(PosAccounts::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdminUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AdminUsers::Id).text().not_null().primary_key())
                    .col(
                        ColumnDef::new(AdminUsers::Username)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(AdminUsers::PasswordHash).text().not_null())
                    .col(ColumnDef::new(AdminUsers::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(AdminUsers::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 2. 账户设置（一对一）
        manager
            .create_table(
                Table::create()
                    .table(PosSettings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PosSettings::Id).text().not_null().primary_key())
                    .col(
                        ColumnDef::new(PosSettings::PosAccountId)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PosSettings::RestaurantName).text().not_null())
                    .col(ColumnDef::new(PosSettings::Address).text().null())
                    .col(ColumnDef::new(PosSettings::Phone).text().null())
                    .col(ColumnDef::new(PosSettings::Email).text().null())
                    .col(ColumnDef::new(PosSettings::FssaiNumber).text().null())
                    .col(
                        ColumnDef::new(PosSettings::TaxRate)
                            .double()
                            .not_null()
                            .default(5.0),
                    )
                    .col(
                        ColumnDef::new(PosSettings::GstInclusive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(PosSettings::PrivacyMode)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PosSettings::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(PosSettings::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut account_fk(PosSettings::Table, PosSettings::PosAccountId))
                    .to_owned(),
            )
            .await?;

        // 3. 授权订阅
        manager
            .create_table(
                Table::create()
                    .table(PosSubscriptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PosSubscriptions::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PosSubscriptions::PosAccountId).text().not_null())
                    .col(
                        ColumnDef::new(PosSubscriptions::Status)
                            .text()
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(PosSubscriptions::ValidFrom).big_integer().not_null())
                    .col(ColumnDef::new(PosSubscriptions::ValidUntil).big_integer().not_null())
                    .col(ColumnDef::new(PosSubscriptions::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(PosSubscriptions::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut account_fk(PosSubscriptions::Table, PosSubscriptions::PosAccountId))
                    .to_owned(),
            )
            .await?;

        // 4. 分类与菜品
        manager
            .create_table(
                Table::create()
                    .table(PosCategories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PosCategories::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(PosCategories::PosAccountId).text().not_null())
                    .col(ColumnDef::new(PosCategories::Name).text().not_null())
                    .col(
                        ColumnDef::new(PosCategories::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PosCategories::CreatedAt).big_integer().not_null())
                    .foreign_key(&mut account_fk(PosCategories::Table, PosCategories::PosAccountId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pos_categories_account_name")
                    .table(PosCategories::Table)
                    .col(PosCategories::PosAccountId)
                    .col(PosCategories::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PosMenuItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PosMenuItems::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(PosMenuItems::PosAccountId).text().not_null())
                    .col(ColumnDef::new(PosMenuItems::Name).text().not_null())
                    .col(ColumnDef::new(PosMenuItems::Price).double().not_null())
                    .col(ColumnDef::new(PosMenuItems::Category).text().not_null())
                    .col(ColumnDef::new(PosMenuItems::Image).text().null())
                    .col(ColumnDef::new(PosMenuItems::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(PosMenuItems::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut account_fk(PosMenuItems::Table, PosMenuItems::PosAccountId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pos_menu_items_account")
                    .table(PosMenuItems::Table)
                    .col(PosMenuItems::PosAccountId)
                    .to_owned(),
            )
            .await?;

        // 5. 订单与订单明细
        manager
            .create_table(
                Table::create()
                    .table(PosOrders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PosOrders::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(PosOrders::PosAccountId).text().not_null())
                    .col(ColumnDef::new(PosOrders::OrderNumber).text().not_null())
                    .col(ColumnDef::new(PosOrders::PaymentMethod).text().not_null())
                    .col(ColumnDef::new(PosOrders::TotalAmount).double().not_null())
                    .col(ColumnDef::new(PosOrders::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(PosOrders::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut account_fk(PosOrders::Table, PosOrders::PosAccountId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pos_orders_account_number")
                    .table(PosOrders::Table)
                    .col(PosOrders::PosAccountId)
                    .col(PosOrders::OrderNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pos_orders_account_created")
                    .table(PosOrders::Table)
                    .col(PosOrders::PosAccountId)
                    .col(PosOrders::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PosOrderItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PosOrderItems::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(PosOrderItems::OrderId).text().not_null())
                    .col(ColumnDef::new(PosOrderItems::ItemName).text().not_null())
                    .col(ColumnDef::new(PosOrderItems::Quantity).integer().not_null())
                    .col(ColumnDef::new(PosOrderItems::UnitPrice).double().not_null())
                    .col(ColumnDef::new(PosOrderItems::TotalPrice).double().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pos_order_items_order")
                            .from(PosOrderItems::Table, PosOrderItems::OrderId)
                            .to(PosOrders::Table, PosOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 6. 数字菜单与主题
        manager
            .create_table(
                Table::create()
                    .table(PosDigitalMenus::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PosDigitalMenus::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PosDigitalMenus::PosAccountId)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PosDigitalMenus::PublicUrlSlug)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PosDigitalMenus::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(PosDigitalMenus::QrCodeGenerated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PosDigitalMenus::LastGeneratedAt)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(PosDigitalMenus::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(PosDigitalMenus::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut account_fk(PosDigitalMenus::Table, PosDigitalMenus::PosAccountId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PosMenuThemes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PosMenuThemes::Id).text().not_null().primary_key())
                    .col(ColumnDef::new(PosMenuThemes::PosAccountId).text().not_null())
                    .col(ColumnDef::new(PosMenuThemes::ThemeName).text().not_null())
                    .col(ColumnDef::new(PosMenuThemes::CustomColors).text().null())
                    .col(
                        ColumnDef::new(PosMenuThemes::Active)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(PosMenuThemes::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(PosMenuThemes::UpdatedAt).big_integer().not_null())
                    .foreign_key(&mut account_fk(PosMenuThemes::Table, PosMenuThemes::PosAccountId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pos_menu_themes_account_theme")
                    .table(PosMenuThemes::Table)
                    .col(PosMenuThemes::PosAccountId)
                    .col(PosMenuThemes::ThemeName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 7. 运营遥测
        manager
            .create_table(
                Table::create()
                    .table(PosTelemetry::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PosTelemetry::Id).text().not_null().primary_key())
                    .col(
                        ColumnDef::new(PosTelemetry::PosAccountId)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PosTelemetry::TotalOrders)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(PosTelemetry::TotalRevenue)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(PosTelemetry::LastActive).big_integer().null())
                    .col(ColumnDef::new(PosTelemetry::CreatedAt).big_integer().not_null())
                    .foreign_key(&mut account_fk(PosTelemetry::Table, PosTelemetry::PosAccountId))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 先删子表，再删父表
        for table in [
            "pos_telemetry",
            "pos_menu_themes",
            "pos_digital_menus",
            "pos_order_items",
            "pos_orders",
            "pos_menu_items",
            "pos_categories",
            "pos_subscriptions",
            "pos_settings",
            "admin_users",
            "pos_accounts",
        ] {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}

/// 指向 pos_accounts.id 的级联外键
fn account_fk<T, C>(table: T, column: C) -> ForeignKeyCreateStatement
where
    T: Iden + Copy + 'static,
    C: IntoIden,
{
    ForeignKey::create()
        .name(format!("fk_{}_account", table.to_string()))
        .from(table, column)
        .to(PosAccounts::Table, PosAccounts::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[derive(DeriveIden, Clone, Copy)]
enum PosAccounts {
    Table,
    Id,
    MobileNumber,
    PinHash,
    RestaurantName,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum AdminUsers {
    Table,
    Id,
    Username,
    PasswordHash,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PosSettings {
    Table,
    Id,
    PosAccountId,
    RestaurantName,
    Address,
    Phone,
    Email,
    FssaiNumber,
    TaxRate,
    GstInclusive,
    PrivacyMode,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PosSubscriptions {
    Table,
    Id,
    PosAccountId,
    Status,
    ValidFrom,
    ValidUntil,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PosCategories {
    Table,
    Id,
    PosAccountId,
    Name,
    SortOrder,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PosMenuItems {
    Table,
    Id,
    PosAccountId,
    Name,
    Price,
    Category,
    Image,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PosOrders {
    Table,
    Id,
    PosAccountId,
    OrderNumber,
    PaymentMethod,
    TotalAmount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PosOrderItems {
    Table,
    Id,
    OrderId,
    ItemName,
    Quantity,
    UnitPrice,
    TotalPrice,
}

#[derive(DeriveIden, Clone, Copy)]
enum PosDigitalMenus {
    Table,
    Id,
    PosAccountId,
    PublicUrlSlug,
    IsActive,
    QrCodeGenerated,
    LastGeneratedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PosMenuThemes {
    Table,
    Id,
    PosAccountId,
    ThemeName,
    CustomColors,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum PosTelemetry {
    Table,
    Id,
    PosAccountId,
    TotalOrders,
    TotalRevenue,
    LastActive,
    CreatedAt,
}
