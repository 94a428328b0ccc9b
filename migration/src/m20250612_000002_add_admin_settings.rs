//! 添加超级管理员全局设置表
//!
//! 1. 创建 admin_settings 表（键值 + JSON 元数据）
//! 2. 写入默认的订单编辑策略：time_limited，30 分钟

use sea_orm_migration::prelude::*;

/// 默认订单编辑策略记录的固定 ID
const ORDER_EDIT_MODE_ID: &str = "00000000-0000-4000-8000-000000000001";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdminSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminSettings::Id)
                            .text()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AdminSettings::SettingKey)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(AdminSettings::SettingValue).text().not_null())
                    .col(ColumnDef::new(AdminSettings::SettingMetadata).text().null())
                    .col(
                        ColumnDef::new(AdminSettings::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdminSettings::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 已存在则跳过，便于在旧库上重复执行
        let seed = Query::insert()
            .into_table(AdminSettings::Table)
            .columns([
                AdminSettings::Id,
                AdminSettings::SettingKey,
                AdminSettings::SettingValue,
                AdminSettings::SettingMetadata,
                AdminSettings::CreatedAt,
                AdminSettings::UpdatedAt,
            ])
            .values_panic([
                ORDER_EDIT_MODE_ID.into(),
                "order_edit_mode".into(),
                "time_limited".into(),
                r#"{"minutes":30}"#.into(),
                Expr::cust("CAST(strftime('%s', 'now') AS INTEGER)"),
                Expr::cust("CAST(strftime('%s', 'now') AS INTEGER)"),
            ])
            .on_conflict(
                OnConflict::column(AdminSettings::SettingKey)
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();

        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminSettings::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AdminSettings {
    Table,
    Id,
    SettingKey,
    SettingValue,
    SettingMetadata,
    CreatedAt,
    UpdatedAt,
}
