//! 导出下载：小票、报表、菜单 PDF 与菜单二维码
//!
//! POS 会话只能导出自己的账户；管理员需要在查询参数中指定 `account_id`。

use axum::{
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use super::load_records;
use crate::database::repository::{
    digital_menu_repository::DigitalMenuRepository, menu_repository::MenuRepository,
    orders_repository::OrdersRepository, settings_repository::SettingsRepository,
};
use crate::entity::pos_settings;
use crate::error::{AppError, AppResult};
use crate::export::{ReportBuilder, ReportDocument, pdf, qr};
use crate::reports::{OrderRecord, month_bounds, week_bounds};
use crate::session::{Principal, authenticate};
use crate::state::AppState;

/// 导出接口的查询参数，日期格式 `YYYY-MM-DD`
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub account_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// 确定导出的账户
pub fn resolve_account(principal: Principal, requested: Option<&str>) -> AppResult<String> {
    let requested = requested.map(str::trim).filter(|id| !id.is_empty());
    match principal {
        Principal::Pos { account_id } => match requested {
            Some(id) if id != account_id => Err(AppError::Forbidden),
            _ => Ok(account_id),
        },
        Principal::Admin { .. } => requested
            .map(str::to_string)
            .ok_or_else(|| AppError::MalformedPayload("account_id is required".to_string())),
    }
}

fn bad_query(message: &str) -> AppError {
    AppError::MalformedPayload(message.to_string())
}

fn file_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn pdf_response(bytes: Vec<u8>, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// 鉴权并解析查询参数，返回 (账户 ID, 查询参数)
fn prepare(
    state: &AppState,
    headers: &HeaderMap,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> AppResult<(String, ExportQuery)> {
    let principal = authenticate(state, headers)?;
    let Query(query) = query?;
    let account_id = resolve_account(principal, query.account_id.as_deref())?;
    Ok((account_id, query))
}

async fn restaurant_settings(state: &AppState, account_id: &str) -> AppResult<pos_settings::Model> {
    SettingsRepository::find_by_account(&state.db, account_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// 读取 [start, end] 的订单并生成报表 PDF
async fn report_response<F>(
    state: &AppState,
    account_id: &str,
    (start, end): (NaiveDate, NaiveDate),
    filename: String,
    build: F,
) -> AppResult<Response>
where
    F: FnOnce(&ReportBuilder, &[OrderRecord]) -> ReportDocument,
{
    let settings = restaurant_settings(state, account_id).await?;
    let clock = state.clock();
    let records = load_records(&state.db, clock, account_id, start, end).await?;

    let builder = ReportBuilder::new(clock, &settings.restaurant_name);
    let bytes = pdf::report_pdf(&build(&builder, &records))?;
    log::debug!("导出报表 {} ({} 笔订单)", filename, records.len());

    Ok(pdf_response(bytes, &filename))
}

fn today(state: &AppState) -> NaiveDate {
    state.clock().local_date(state.now())
}

// ==================== 小票 ====================

/// `GET /export/orders/{order_id}/receipt.pdf`
pub async fn export_receipt(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> AppResult<Response> {
    let (account_id, _) = prepare(&state, &headers, query)?;

    let order = OrdersRepository::find_owned(&state.db, &account_id, &order_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let settings = restaurant_settings(&state, &account_id).await?;

    let bytes = pdf::receipt_pdf(&order, &settings, state.config.report_offset())?;
    Ok(pdf_response(
        bytes,
        &format!("receipt-{}.pdf", order.order.order_number),
    ))
}

// ==================== 报表 ====================

/// `GET /export/reports/daily.pdf?date=`
pub async fn export_daily_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> AppResult<Response> {
    let (account_id, query) = prepare(&state, &headers, query)?;
    let date = query.date.unwrap_or_else(|| today(&state));

    report_response(
        &state,
        &account_id,
        (date, date),
        format!("daily-report-{}.pdf", file_date(date)),
        |builder, orders| builder.daily(orders, date),
    )
    .await
}

/// `GET /export/reports/weekly.pdf?date=`，周日开始
pub async fn export_weekly_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> AppResult<Response> {
    let (account_id, query) = prepare(&state, &headers, query)?;
    let date = query.date.unwrap_or_else(|| today(&state));
    let week = week_bounds(date).ok_or_else(|| bad_query("Invalid date"))?;

    report_response(
        &state,
        &account_id,
        week,
        format!("weekly-report-{}.pdf", file_date(week.0)),
        |builder, orders| builder.weekly(orders, week),
    )
    .await
}

/// `GET /export/reports/monthly.pdf?year=&month=`
pub async fn export_monthly_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> AppResult<Response> {
    let (account_id, query) = prepare(&state, &headers, query)?;
    let today = today(&state);
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());
    let bounds = month_bounds(year, month).ok_or_else(|| bad_query("Invalid year or month"))?;

    report_response(
        &state,
        &account_id,
        bounds,
        format!("monthly-report-{}-{:02}.pdf", year, month),
        |builder, orders| builder.monthly(orders, year, month),
    )
    .await
}

/// `GET /export/reports/yearly.pdf?year=`
pub async fn export_yearly_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> AppResult<Response> {
    let (account_id, query) = prepare(&state, &headers, query)?;
    let year = query.year.unwrap_or(today(&state).year());
    let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| bad_query("Invalid year"))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or_else(|| bad_query("Invalid year"))?;

    report_response(
        &state,
        &account_id,
        (start, end),
        format!("yearly-report-{}.pdf", year),
        |builder, orders| builder.yearly(orders, year),
    )
    .await
}

/// 区间报表的起止日期，默认本月 1 日到今天
fn date_range(state: &AppState, query: &ExportQuery) -> AppResult<(NaiveDate, NaiveDate)> {
    let today = today(state);
    let start = query
        .start
        .unwrap_or_else(|| today.with_day(1).unwrap_or(today));
    let end = query.end.unwrap_or(today);
    if start > end {
        return Err(bad_query("start must not be after end"));
    }
    Ok((start, end))
}

/// `GET /export/reports/payment-methods.pdf?start=&end=`
pub async fn export_payment_methods_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> AppResult<Response> {
    let (account_id, query) = prepare(&state, &headers, query)?;
    let (start, end) = date_range(&state, &query)?;

    report_response(
        &state,
        &account_id,
        (start, end),
        format!(
            "payment-methods-{}-to-{}.pdf",
            file_date(start),
            file_date(end)
        ),
        |builder, orders| builder.payment_methods(orders, start, end),
    )
    .await
}

/// `GET /export/reports/item-wise.pdf?start=&end=`
pub async fn export_item_wise_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> AppResult<Response> {
    let (account_id, query) = prepare(&state, &headers, query)?;
    let (start, end) = date_range(&state, &query)?;

    report_response(
        &state,
        &account_id,
        (start, end),
        format!("item-wise-{}-to-{}.pdf", file_date(start), file_date(end)),
        |builder, orders| builder.item_wise(orders, start, end),
    )
    .await
}

// ==================== 菜单 ====================

/// `GET /export/menu.pdf`
pub async fn export_menu_pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> AppResult<Response> {
    let (account_id, _) = prepare(&state, &headers, query)?;

    let settings = restaurant_settings(&state, &account_id).await?;
    let items = MenuRepository::list(&state.db, &account_id).await?;

    let bytes = pdf::menu_pdf(&settings, &items)?;
    Ok(pdf_response(bytes, "menu.pdf"))
}

/// `GET /export/menu-qr.svg`，同时记录二维码生成时间
pub async fn export_menu_qr(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> AppResult<Response> {
    let (account_id, _) = prepare(&state, &headers, query)?;

    let menu = DigitalMenuRepository::find_by_account(&state.db, &account_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let url = qr::public_menu_url(&state.config.server.public_base_url, &menu.public_url_slug);
    let svg = qr::menu_qr_svg(&url)?;

    DigitalMenuRepository::mark_qr_generated(&state.db, menu, state.now()).await?;
    log::info!("账户 {} 生成菜单二维码: {}", account_id, url);

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(id: &str) -> Principal {
        Principal::Pos {
            account_id: id.to_string(),
        }
    }

    fn admin() -> Principal {
        Principal::Admin {
            admin_id: "admin-1".to_string(),
            username: "root".to_string(),
        }
    }

    #[test]
    fn pos_sessions_export_their_own_account() {
        assert_eq!(resolve_account(pos("acc-1"), None).unwrap(), "acc-1");
        assert_eq!(resolve_account(pos("acc-1"), Some("acc-1")).unwrap(), "acc-1");
        assert!(matches!(
            resolve_account(pos("acc-1"), Some("acc-2")),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn admins_must_name_the_account() {
        assert_eq!(resolve_account(admin(), Some("acc-9")).unwrap(), "acc-9");
        assert!(matches!(
            resolve_account(admin(), None),
            Err(AppError::MalformedPayload(_))
        ));
        assert!(matches!(
            resolve_account(admin(), Some("  ")),
            Err(AppError::MalformedPayload(_))
        ));
    }
}
