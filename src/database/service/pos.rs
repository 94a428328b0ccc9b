//! POS 过程：登录、设置、菜单、订单与销售统计

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use super::{EditDecision, EditMode, authorize_existing, load_records, page_limit};
use crate::billing::PaymentMethod;
use crate::database::dto::{
    AccountDaysArgs, AccountIdArgs, CreateOrderArgs, GetOrdersArgs, MenuItemData,
    MenuItemRefArgs, NewOrder, OrderItemInput, OrderRefArgs, PosLoginArgs, TelemetryArgs,
    UpdatePaymentMethodArgs, UpsertCategoriesArgs, UpsertMenuItemArgs, UpsertSettingsArgs,
};
use crate::database::repository::{
    accounts_repository::{AccountsRepository, days_remaining},
    categories_repository::CategoriesRepository,
    menu_repository::MenuRepository,
    orders_repository::{OrderWithItems, OrdersRepository},
    settings_repository::SettingsRepository,
};
use crate::entity::{
    pos_accounts, pos_categories, pos_menu_items, pos_orders, pos_settings, pos_telemetry,
};
use crate::envelope::{RpcResult, ok};
use crate::error::{AppError, AppResult};
use crate::reports::{
    DaySales, ItemSales, PaymentStats, PeriodStats, item_breakdown, payment_breakdown,
    week_start, window_start,
};
use crate::session::{Principal, authorize_account, bearer_token};
use crate::state::AppState;
use crate::utils::password::verify_secret;
use crate::utils::validation::{
    optional_text, require_text, round_money, validate_email, validate_positive_days,
    validate_price, validate_tax_rate,
};

const DEFAULT_ORDERS_LIMIT: u64 = 100;
const MAX_ORDERS_LIMIT: u64 = 1000;
const DEFAULT_ITEM_SALES_DAYS: i64 = 30;
const MAX_ITEM_SALES_DAYS: i64 = 366;
const OVERVIEW_DAYS: u32 = 7;
/// 客户端总额与明细合计允许的误差
const TOTAL_TOLERANCE: f64 = 0.01 + 1e-9;

// ==================== 返回类型 ====================

#[derive(Debug, Serialize)]
pub struct PosLoginResult {
    pub token: String,
    pub account_id: String,
    pub restaurant_name: String,
    pub license_valid_until: i64,
    pub days_remaining: i64,
}

#[derive(Debug, Serialize)]
pub struct LogoutResult {
    pub logged_out: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteResult {
    pub deleted: bool,
}

/// 报表页所需的汇总数据
#[derive(Debug, Serialize)]
pub struct SalesOverview {
    pub period: PeriodStats,
    pub last_7_days: Vec<DaySales>,
    /// 本月各支付方式
    pub payment_methods: Vec<PaymentStats>,
}

// ==================== 订单校验 ====================

/// 当天自动订单号的前缀 `ORD-YYYYMMDD-`
pub fn order_number_prefix(date: NaiveDate) -> String {
    format!("ORD-{}-", date.format("%Y%m%d"))
}

pub fn parse_payment_method(value: &str) -> AppResult<PaymentMethod> {
    value.parse().map_err(AppError::Validation)
}

/// 校验下单明细并核对总额，返回规范化的明细与按明细计算的总额
pub fn validate_order_items(
    items: Vec<OrderItemInput>,
    total_amount: f64,
) -> AppResult<(Vec<OrderItemInput>, f64)> {
    if items.is_empty() {
        return Err(AppError::validation("Order must contain at least one item"));
    }

    let mut computed = 0.0;
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let item_name = require_text("Item name", &item.item_name)?;
        if item.quantity < 1 {
            return Err(AppError::validation("Item quantity must be at least 1"));
        }
        if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            return Err(AppError::validation("Item price cannot be negative"));
        }

        let unit_price = round_money(item.unit_price);
        computed += round_money(unit_price * f64::from(item.quantity));
        lines.push(OrderItemInput {
            item_name,
            quantity: item.quantity,
            unit_price,
        });
    }

    let computed = round_money(computed);
    if !total_amount.is_finite() || (computed - total_amount).abs() > TOTAL_TOLERANCE {
        return Err(AppError::rejected("Order total does not match item totals"));
    }

    Ok((lines, computed))
}

fn order_not_found() -> AppError {
    AppError::rejected("Order not found")
}

// ==================== 认证 ====================

/// POS 登录：校验 PIN、账户状态与授权有效期
pub async fn pos_login(
    State(state): State<AppState>,
    payload: Result<Json<PosLoginArgs>, JsonRejection>,
) -> RpcResult<PosLoginResult> {
    let Json(args) = payload?;
    let mobile_number = args.mobile_number.trim();

    let account = AccountsRepository::find_by_mobile(&state.db, mobile_number)
        .await?
        .filter(|account| verify_secret(&args.pin, &account.pin_hash));
    let Some(account) = account else {
        log::warn!("POS 登录失败: {}", mobile_number);
        return Err(AppError::rejected("Invalid mobile number or PIN"));
    };

    if account.status != pos_accounts::STATUS_ACTIVE {
        log::warn!("已禁用的账户尝试登录: {}", account.id);
        return Err(AppError::rejected("Account is disabled"));
    }

    let now = state.now();
    let subscription = AccountsRepository::latest_subscription(&state.db, &account.id)
        .await?
        .filter(|subscription| subscription.is_valid_at(now));
    let Some(subscription) = subscription else {
        log::warn!("授权已过期的账户尝试登录: {}", account.id);
        return Err(AppError::rejected("License expired"));
    };

    AccountsRepository::touch_last_active(&state.db, &account.id, now).await?;

    let restaurant_name = SettingsRepository::find_by_account(&state.db, &account.id)
        .await?
        .map(|settings| settings.restaurant_name)
        .unwrap_or(account.restaurant_name);

    let token = state.sessions.issue(Principal::Pos {
        account_id: account.id.clone(),
    });
    log::info!("账户 {} ({}) 登录成功", account.id, restaurant_name);

    ok(PosLoginResult {
        token,
        account_id: account.id,
        restaurant_name,
        license_valid_until: subscription.valid_until,
        days_remaining: days_remaining(subscription.valid_until, now),
    })
}

/// 注销当前令牌（管理员与 POS 通用）
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> RpcResult<LogoutResult> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    ok(LogoutResult {
        logged_out: state.sessions.revoke(token),
    })
}

// ==================== 餐厅设置 ====================

pub async fn get_pos_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AccountIdArgs>, JsonRejection>,
) -> RpcResult<pos_settings::Model> {
    let Json(args) = payload?;
    authorize_account(&state, &headers, &args.account_id)?;

    let settings = SettingsRepository::find_by_account(&state.db, &args.account_id)
        .await?
        .ok_or_else(|| AppError::rejected("Settings not found"))?;
    ok(settings)
}

/// 保存餐厅设置，未提供的字段保持原值
pub async fn upsert_pos_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpsertSettingsArgs>, JsonRejection>,
) -> RpcResult<pos_settings::Model> {
    let Json(mut args) = payload?;
    authorize_existing(&state, &headers, &args.account_id).await?;

    args.restaurant_name = require_text("Restaurant name", &args.restaurant_name)?;
    if let Some(rate) = args.tax_rate {
        validate_tax_rate(rate)?;
    }
    args.address = args.address.map(optional_text);
    args.phone = args.phone.map(optional_text);
    args.email = args.email.map(optional_text);
    args.fssai_number = args.fssai_number.map(optional_text);
    if let Some(Some(email)) = &args.email {
        validate_email(email)?;
    }

    let settings = SettingsRepository::upsert(&state.db, args, state.now()).await?;
    log::info!("账户 {} 更新了餐厅设置", settings.pos_account_id);
    ok(settings)
}

// ==================== 分类与菜品 ====================

pub async fn get_categories(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AccountIdArgs>, JsonRejection>,
) -> RpcResult<Vec<pos_categories::Model>> {
    let Json(args) = payload?;
    authorize_account(&state, &headers, &args.account_id)?;
    ok(CategoriesRepository::list(&state.db, &args.account_id).await?)
}

/// 用给定的有序列表替换分类
pub async fn upsert_categories(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpsertCategoriesArgs>, JsonRejection>,
) -> RpcResult<Vec<pos_categories::Model>> {
    let Json(args) = payload?;
    authorize_existing(&state, &headers, &args.account_id).await?;

    let categories =
        CategoriesRepository::replace(&state.db, &args.account_id, args.categories, state.now())
            .await?;
    log::debug!("账户 {} 现有 {} 个分类", args.account_id, categories.len());
    ok(categories)
}

pub async fn list_menu_items(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AccountIdArgs>, JsonRejection>,
) -> RpcResult<Vec<pos_menu_items::Model>> {
    let Json(args) = payload?;
    authorize_account(&state, &headers, &args.account_id)?;
    ok(MenuRepository::list(&state.db, &args.account_id).await?)
}

/// 新增或更新菜品；带 item_id 时只能更新本账户的菜品
pub async fn upsert_menu_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpsertMenuItemArgs>, JsonRejection>,
) -> RpcResult<pos_menu_items::Model> {
    let Json(args) = payload?;
    authorize_existing(&state, &headers, &args.account_id).await?;

    let data = MenuItemData {
        name: require_text("Item name", &args.name)?,
        price: validate_price(args.price)?,
        category: require_text("Category", &args.category)?,
        image: args.image.map(optional_text),
    };
    let now = state.now();

    let item_id = args
        .item_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    let item = match item_id {
        Some(item_id) => {
            let existing = MenuRepository::find_owned(&state.db, &args.account_id, item_id)
                .await?
                .ok_or_else(|| AppError::rejected("Menu item not found"))?;
            MenuRepository::update(&state.db, existing, data, now).await?
        }
        None => MenuRepository::insert(&state.db, &args.account_id, data, now).await?,
    };

    ok(item)
}

pub async fn delete_menu_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<MenuItemRefArgs>, JsonRejection>,
) -> RpcResult<DeleteResult> {
    let Json(args) = payload?;
    authorize_account(&state, &headers, &args.account_id)?;

    let rows = MenuRepository::delete_owned(&state.db, &args.account_id, &args.item_id).await?;
    if rows == 0 {
        return Err(AppError::rejected("Menu item not found"));
    }
    ok(DeleteResult { deleted: true })
}

// ==================== 订单 ====================

/// 下单：校验明细与总额，生成订单号并更新遥测
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateOrderArgs>, JsonRejection>,
) -> RpcResult<OrderWithItems> {
    let Json(args) = payload?;
    authorize_existing(&state, &headers, &args.account_id).await?;

    let payment_method = parse_payment_method(&args.payment_method)?;
    let (items, total_amount) = validate_order_items(args.items, args.total_amount)?;
    let order_number = args
        .order_number
        .map(|number| number.trim().to_string())
        .filter(|number| !number.is_empty());

    let now = state.now();
    let prefix = order_number_prefix(state.clock().local_date(now));
    let input = NewOrder {
        order_number,
        payment_method: payment_method.as_str().to_string(),
        total_amount,
        items,
    };

    let order = OrdersRepository::create(&state.db, &args.account_id, input, &prefix, now)
        .await?
        .ok_or_else(|| AppError::rejected("Order number already exists"))?;
    log::info!(
        "账户 {} 新订单 {}: {:.2} ({})",
        args.account_id,
        order.order.order_number,
        order.order.total_amount,
        order.order.payment_method
    );

    ok(order)
}

/// 单独累加遥测（离线补录等场景）
pub async fn update_pos_telemetry(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<TelemetryArgs>, JsonRejection>,
) -> RpcResult<pos_telemetry::Model> {
    let Json(args) = payload?;
    authorize_existing(&state, &headers, &args.account_id).await?;

    if !args.order_total.is_finite() || args.order_total < 0.0 {
        return Err(AppError::validation("Order total cannot be negative"));
    }

    let telemetry = AccountsRepository::record_order(
        &state.db,
        &args.account_id,
        round_money(args.order_total),
        state.now(),
    )
    .await?;
    ok(telemetry)
}

pub async fn get_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<GetOrdersArgs>, JsonRejection>,
) -> RpcResult<Vec<OrderWithItems>> {
    let Json(args) = payload?;
    authorize_account(&state, &headers, &args.account_id)?;

    let limit = page_limit(args.limit, DEFAULT_ORDERS_LIMIT, MAX_ORDERS_LIMIT);
    ok(OrdersRepository::list_with_items(&state.db, &args.account_id, limit, 0).await?)
}

pub async fn can_edit_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<OrderRefArgs>, JsonRejection>,
) -> RpcResult<EditDecision> {
    let Json(args) = payload?;
    authorize_account(&state, &headers, &args.account_id)?;

    let order = OrdersRepository::find_owned(&state.db, &args.account_id, &args.order_id)
        .await?
        .ok_or_else(order_not_found)?;
    let mode = EditMode::load(&state.db).await?;

    ok(mode.decide(order.order.created_at, state.now()))
}

/// 修改支付方式；管理员（令牌且 is_admin）不受修改策略限制
pub async fn update_order_payment_method(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpdatePaymentMethodArgs>, JsonRejection>,
) -> RpcResult<pos_orders::Model> {
    let Json(args) = payload?;
    let principal = authorize_account(&state, &headers, &args.account_id)?;
    let payment_method = parse_payment_method(&args.payment_method)?;

    let order = OrdersRepository::find_owned(&state.db, &args.account_id, &args.order_id)
        .await?
        .ok_or_else(order_not_found)?;
    let now = state.now();

    let admin_override = principal.is_admin() && args.is_admin.unwrap_or(false);
    if !admin_override {
        let decision = EditMode::load(&state.db).await?.decide(order.order.created_at, now);
        if !decision.can_edit {
            return Err(AppError::Rejected(decision.reason));
        }
    }

    let previous = order.order.payment_method.clone();
    let updated =
        OrdersRepository::update_payment_method(&state.db, order.order, payment_method, now)
            .await?;
    log::info!(
        "订单 {} 支付方式 {} -> {}{}",
        updated.order_number,
        previous,
        updated.payment_method,
        if admin_override { " (管理员)" } else { "" }
    );

    ok(updated)
}

// ==================== 销售统计 ====================

/// 最近 N 天各菜品销量，按销售额降序
pub async fn get_item_sales(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AccountDaysArgs>, JsonRejection>,
) -> RpcResult<Vec<ItemSales>> {
    let Json(args) = payload?;
    authorize_account(&state, &headers, &args.account_id)?;
    let days = validate_positive_days("Days", args.days.unwrap_or(DEFAULT_ITEM_SALES_DAYS))?
        .min(MAX_ITEM_SALES_DAYS);

    let clock = state.clock();
    let today = clock.local_date(state.now());
    let start = window_start(today, days as u32);
    let records = load_records(&state.db, clock, &args.account_id, start, today).await?;

    ok(item_breakdown(&records))
}

/// 今日 / 本周 / 本月 / 本年统计、最近 7 天走势与本月支付方式分布
pub async fn get_sales_overview(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AccountIdArgs>, JsonRejection>,
) -> RpcResult<SalesOverview> {
    let Json(args) = payload?;
    authorize_account(&state, &headers, &args.account_id)?;

    let clock = state.clock();
    let now = state.now();
    let today = clock.local_date(now);
    let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
    let month_start = today.with_day(1).unwrap_or(today);
    let start = [
        Some(year_start),
        week_start(today),
        today.checked_sub_days(Days::new(u64::from(OVERVIEW_DAYS) - 1)),
    ]
    .into_iter()
    .flatten()
    .min()
    .unwrap_or(today);

    let records = load_records(&state.db, clock, &args.account_id, start, today).await?;
    let this_month = clock.orders_between(&records, month_start, today);

    ok(SalesOverview {
        period: clock.period_stats(&records, now),
        last_7_days: clock.last_n_days(&records, today, OVERVIEW_DAYS),
        payment_methods: payment_breakdown(this_month.iter().copied()),
    })
}
