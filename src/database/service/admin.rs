//! 管理后台过程（除登录外都需要管理员令牌）

use std::collections::HashSet;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use serde::Serialize;

use super::{EditMode, load_records, page_limit};
use crate::database::db::{self, BackupResult};
use crate::database::dto::{
    AccountDaysArgs, AccountIdArgs, AccountOrdersArgs, AdminLoginArgs, CreateAccountArgs,
    ExtendLicenseArgs, NewAccount, SearchAccountsArgs, SetLogLevelArgs, UpsertAdminSettingArgs,
};
use crate::database::repository::{
    accounts_repository::{AccountOverview, AccountsRepository, days_remaining, license_expiry},
    admin_repository::{AdminRepository, ORDER_EDIT_MODE_KEY},
    categories_repository::CategoriesRepository,
    digital_menu_repository::DigitalMenuRepository,
    menu_repository::MenuRepository,
    orders_repository::{OrderWithItems, OrdersRepository},
    settings_repository::SettingsRepository,
};
use crate::entity::{
    admin_settings, pos_accounts, pos_categories, pos_digital_menus, pos_menu_items,
    pos_menu_themes, pos_settings, pos_subscriptions, pos_telemetry,
};
use crate::envelope::{RpcResult, ok};
use crate::error::AppError;
use crate::reports::{
    DaySales, ItemSales, PaymentStats, item_breakdown, payment_breakdown, summary,
    window_start,
};
use crate::session::{Principal, require_admin};
use crate::state::AppState;
use crate::utils::logs::{self, LogLevel};
use crate::utils::password::{hash_secret, verify_secret};
use crate::utils::validation::{
    require_text, validate_license_days, validate_mobile_number, validate_pin,
    validate_positive_days,
};

const DEFAULT_SEARCH_LIMIT: u64 = 50;
const DEFAULT_ACCOUNT_ORDERS_LIMIT: u64 = 50;
const MAX_PAGE_LIMIT: u64 = 500;
const DEFAULT_ANALYTICS_DAYS: i64 = 30;
const MAX_ANALYTICS_DAYS: i64 = 366;
const TOP_ITEMS: usize = 10;

// ==================== 返回类型 ====================

#[derive(Debug, Serialize)]
pub struct AdminInfo {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResult {
    pub token: String,
    pub admin: AdminInfo,
}

#[derive(Debug, Serialize)]
pub struct CreatedAccount {
    pub account_id: String,
    pub mobile_number: String,
    pub restaurant_name: String,
    pub license_valid_until: i64,
}

#[derive(Debug, Serialize)]
pub struct AccountSearchResult {
    pub accounts: Vec<AccountOverview>,
    pub total_count: u64,
}

#[derive(Debug, Serialize)]
pub struct ToggleStatusResult {
    pub new_status: String,
}

#[derive(Debug, Serialize)]
pub struct LicenseExtension {
    pub license_valid_until: i64,
    pub days_remaining: i64,
}

/// 账户详情页所需的全部数据
#[derive(Debug, Serialize)]
pub struct AccountFullDetails {
    pub account: pos_accounts::Model,
    pub settings: Option<pos_settings::Model>,
    pub subscription: Option<pos_subscriptions::Model>,
    pub telemetry: Option<pos_telemetry::Model>,
    pub digital_menu: Option<pos_digital_menus::Model>,
    pub active_theme: Option<pos_menu_themes::Model>,
}

#[derive(Debug, Serialize)]
pub struct AccountMenu {
    pub menu_items: Vec<pos_menu_items::Model>,
    pub categories: Vec<pos_categories::Model>,
}

#[derive(Debug, Serialize)]
pub struct AccountOrders {
    pub orders: Vec<OrderWithItems>,
    pub total_count: u64,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub unique_items_sold: usize,
}

#[derive(Debug, Serialize)]
pub struct AccountAnalytics {
    pub days: i64,
    pub summary: AnalyticsSummary,
    pub top_items: Vec<ItemSales>,
    pub daily_sales: Vec<DaySales>,
    pub payment_methods: Vec<PaymentStats>,
}

fn account_not_found() -> AppError {
    AppError::rejected("Account not found")
}

// ==================== 认证 ====================

/// 管理员登录
pub async fn admin_login(
    State(state): State<AppState>,
    payload: Result<Json<AdminLoginArgs>, JsonRejection>,
) -> RpcResult<AdminLoginResult> {
    let Json(args) = payload?;
    let username = args.username.trim();

    let user = AdminRepository::find_user_by_username(&state.db, username)
        .await?
        .filter(|user| verify_secret(&args.password, &user.password_hash));
    let Some(user) = user else {
        log::warn!("管理员登录失败: {}", username);
        return Err(AppError::rejected("Invalid username or password"));
    };

    let token = state.sessions.issue(Principal::Admin {
        admin_id: user.id.clone(),
        username: user.username.clone(),
    });
    log::info!("管理员 {} 登录成功", user.username);

    ok(AdminLoginResult {
        token,
        admin: AdminInfo {
            id: user.id,
            username: user.username,
        },
    })
}

// ==================== 账户与授权 ====================

/// 创建 POS 账户及其默认数据
pub async fn create_pos_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateAccountArgs>, JsonRejection>,
) -> RpcResult<CreatedAccount> {
    let (_, admin) = require_admin(&state, &headers)?;
    let Json(args) = payload?;

    let mobile_number = args.mobile_number.trim().to_string();
    validate_mobile_number(&mobile_number)?;
    validate_pin(&args.pin)?;
    let restaurant_name = require_text("Restaurant name", &args.restaurant_name)?;
    let days = validate_license_days(
        "License duration",
        args.license_duration_days
            .unwrap_or(state.config.license.default_duration_days),
    )?;

    if AccountsRepository::find_by_mobile(&state.db, &mobile_number)
        .await?
        .is_some()
    {
        return Err(AppError::rejected(
            "An account with this mobile number already exists",
        ));
    }

    let now = state.now();
    let account = AccountsRepository::create_with_defaults(
        &state.db,
        NewAccount {
            mobile_number,
            pin_hash: hash_secret(&args.pin)?,
            restaurant_name,
            license_duration_days: days,
        },
        now,
    )
    .await?;

    log::info!(
        "管理员 {} 创建了账户 {} ({}), 授权 {} 天",
        admin,
        account.id,
        account.restaurant_name,
        days
    );

    ok(CreatedAccount {
        account_id: account.id,
        mobile_number: account.mobile_number,
        restaurant_name: account.restaurant_name,
        license_valid_until: license_expiry(now, days),
    })
}

/// 获取所有账户概览，按创建时间倒序
pub async fn get_pos_accounts(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> RpcResult<Vec<AccountOverview>> {
    require_admin(&state, &headers)?;
    ok(AccountsRepository::list_overviews(&state.db, state.now()).await?)
}

/// 按名称或手机号、状态搜索账户
pub async fn search_pos_accounts(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SearchAccountsArgs>, JsonRejection>,
) -> RpcResult<AccountSearchResult> {
    require_admin(&state, &headers)?;
    let Json(args) = payload?;

    let (accounts, total_count) = AccountsRepository::search(
        &state.db,
        args.search_term.as_deref(),
        args.status.as_deref(),
        page_limit(args.limit, DEFAULT_SEARCH_LIMIT, MAX_PAGE_LIMIT),
        args.offset.unwrap_or(0),
        state.now(),
    )
    .await?;

    ok(AccountSearchResult {
        accounts,
        total_count,
    })
}

/// 启用 / 禁用账户；禁用时注销其全部会话
pub async fn toggle_pos_account_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AccountIdArgs>, JsonRejection>,
) -> RpcResult<ToggleStatusResult> {
    let (_, admin) = require_admin(&state, &headers)?;
    let Json(args) = payload?;

    let new_status = AccountsRepository::toggle_status(&state.db, &args.account_id, state.now())
        .await?
        .ok_or_else(account_not_found)?;

    if new_status == pos_accounts::STATUS_DISABLED {
        let revoked = state.sessions.revoke_account(&args.account_id);
        log::info!("账户 {} 已禁用，注销 {} 个会话", args.account_id, revoked);
    }
    log::info!("管理员 {} 将账户 {} 状态改为 {}", admin, args.account_id, new_status);

    ok(ToggleStatusResult { new_status })
}

/// 延长授权，从 max(当前时间, 原到期时间) 起算
pub async fn extend_pos_license(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ExtendLicenseArgs>, JsonRejection>,
) -> RpcResult<LicenseExtension> {
    let (_, admin) = require_admin(&state, &headers)?;
    let Json(args) = payload?;
    let days = validate_license_days("Days", args.days)?;

    if !AccountsRepository::exists(&state.db, &args.account_id).await? {
        return Err(account_not_found());
    }

    let now = state.now();
    let valid_until =
        AccountsRepository::extend_license(&state.db, &args.account_id, days, now).await?;
    log::info!("管理员 {} 为账户 {} 延长授权 {} 天", admin, args.account_id, days);

    ok(LicenseExtension {
        license_valid_until: valid_until,
        days_remaining: days_remaining(valid_until, now),
    })
}

// ==================== 账户数据查看 ====================

/// 账户详情
pub async fn get_account_full_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AccountIdArgs>, JsonRejection>,
) -> RpcResult<AccountFullDetails> {
    require_admin(&state, &headers)?;
    let Json(args) = payload?;
    let id = args.account_id.as_str();

    let account = AccountsRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(account_not_found)?;

    ok(AccountFullDetails {
        account,
        settings: SettingsRepository::find_by_account(&state.db, id).await?,
        subscription: AccountsRepository::latest_subscription(&state.db, id).await?,
        telemetry: AccountsRepository::find_telemetry(&state.db, id).await?,
        digital_menu: DigitalMenuRepository::find_by_account(&state.db, id).await?,
        active_theme: DigitalMenuRepository::active_theme(&state.db, id).await?,
    })
}

pub async fn get_account_menu(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AccountIdArgs>, JsonRejection>,
) -> RpcResult<AccountMenu> {
    require_admin(&state, &headers)?;
    let Json(args) = payload?;

    ok(AccountMenu {
        menu_items: MenuRepository::list(&state.db, &args.account_id).await?,
        categories: CategoriesRepository::list(&state.db, &args.account_id).await?,
    })
}

pub async fn get_account_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AccountOrdersArgs>, JsonRejection>,
) -> RpcResult<AccountOrders> {
    require_admin(&state, &headers)?;
    let Json(args) = payload?;

    let orders = OrdersRepository::list_with_items(
        &state.db,
        &args.account_id,
        page_limit(args.limit, DEFAULT_ACCOUNT_ORDERS_LIMIT, MAX_PAGE_LIMIT),
        args.offset.unwrap_or(0),
    )
    .await?;
    let total_count = OrdersRepository::count(&state.db, &args.account_id).await?;

    ok(AccountOrders {
        orders,
        total_count,
    })
}

/// 最近 N 天的销售分析
pub async fn get_account_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AccountDaysArgs>, JsonRejection>,
) -> RpcResult<AccountAnalytics> {
    require_admin(&state, &headers)?;
    let Json(args) = payload?;
    let days = validate_positive_days("Days", args.days.unwrap_or(DEFAULT_ANALYTICS_DAYS))?
        .min(MAX_ANALYTICS_DAYS);

    let clock = state.clock();
    let today = clock.local_date(state.now());
    let start = window_start(today, days as u32);
    let records = load_records(&state.db, clock, &args.account_id, start, today).await?;

    let totals = summary(&records);
    let unique_items_sold = records
        .iter()
        .flat_map(|order| order.items.iter().map(|item| item.item_name.as_str()))
        .collect::<HashSet<_>>()
        .len();
    let mut top_items = item_breakdown(&records);
    top_items.truncate(TOP_ITEMS);

    ok(AccountAnalytics {
        days,
        summary: AnalyticsSummary {
            total_orders: totals.total_orders,
            total_revenue: totals.total_revenue,
            average_order_value: totals.average_order_value,
            unique_items_sold,
        },
        top_items,
        daily_sales: clock.last_n_days(&records, today, days as u32),
        payment_methods: payment_breakdown(&records),
    })
}

// ==================== 系统设置 ====================

pub async fn get_admin_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> RpcResult<Vec<admin_settings::Model>> {
    require_admin(&state, &headers)?;
    ok(AdminRepository::list_settings(&state.db).await?)
}

/// 新增或更新设置；`order_edit_mode` 的值会先校验
pub async fn upsert_admin_setting(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpsertAdminSettingArgs>, JsonRejection>,
) -> RpcResult<admin_settings::Model> {
    let (_, admin) = require_admin(&state, &headers)?;
    let Json(args) = payload?;

    let key = require_text("Setting key", &args.key)?;
    let value = args.value.trim().to_string();
    if key == ORDER_EDIT_MODE_KEY {
        EditMode::parse(&value, args.metadata.as_ref())?;
    }

    let setting =
        AdminRepository::upsert_setting(&state.db, &key, value, args.metadata, state.now())
            .await?;
    log::info!("管理员 {} 更新设置 {} = {}", admin, key, setting.setting_value);

    ok(setting)
}

pub async fn get_log_level(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> RpcResult<LogLevel> {
    require_admin(&state, &headers)?;
    ok(logs::get_log_level())
}

/// 运行时调整日志级别（重启后恢复配置值）
pub async fn set_log_level(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SetLogLevelArgs>, JsonRejection>,
) -> RpcResult<LogLevel> {
    require_admin(&state, &headers)?;
    let Json(args) = payload?;
    ok(logs::set_log_level(&args.level)?)
}

/// 热备份数据库到配置的备份目录
pub async fn backup_database(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> RpcResult<BackupResult> {
    let (_, admin) = require_admin(&state, &headers)?;
    let dir = state.config.backup_dir()?;

    let result = db::backup_database(&state.db, &dir).await?;
    log::info!("管理员 {} 备份数据库到 {}", admin, result.path);

    ok(result)
}
