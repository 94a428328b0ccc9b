//! 数字菜单过程与公开页面

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
    response::Html,
};
use serde::Serialize;

use super::authorize_existing;
use crate::database::dto::{
    AccountIdArgs, InitDigitalMenuArgs, PublicMenuArgs, SetMenuActiveArgs, UpdateThemeArgs,
};
use crate::database::repository::{
    accounts_repository::{AccountsRepository, DEFAULT_TAX_RATE},
    digital_menu_repository::DigitalMenuRepository,
    menu_repository::MenuRepository,
    settings_repository::SettingsRepository,
};
use crate::entity::{custom_colors::CustomColors, pos_digital_menus, pos_menu_themes};
use crate::envelope::{RpcResult, ok};
use crate::error::{AppError, AppResult};
use crate::export::qr::public_menu_url;
use crate::menu::render::{render_menu_page, render_not_found_page};
use crate::menu::themes::{THEMES, Theme, find_theme};
use crate::menu::{AppliedTheme, MenuFilter, PublicMenu, PublicSettings};
use crate::session::authorize_account;
use crate::state::AppState;
use crate::utils::validation::{require_text, validate_css_color};

#[derive(Debug, Serialize)]
pub struct InitializedMenu {
    pub digital_menu: pos_digital_menus::Model,
    pub created: bool,
    pub public_url: String,
}

#[derive(Debug, Serialize)]
pub struct DigitalMenuSettings {
    pub digital_menu: Option<pos_digital_menus::Model>,
    pub active_theme: Option<pos_menu_themes::Model>,
    pub public_url: Option<String>,
}

fn menu_not_initialized() -> AppError {
    AppError::rejected("Digital menu not initialized")
}

/// 解析自定义颜色：只允许主题已有的颜色键，值必须是安全的 CSS 颜色
pub fn parse_custom_colors(value: Option<serde_json::Value>) -> AppResult<Option<CustomColors>> {
    let Some(value) = value.filter(|v| !v.is_null()) else {
        return Ok(None);
    };

    let colors: CustomColors = serde_json::from_value(value).map_err(|e| {
        AppError::validation(format!("Invalid custom colors: {}", e))
    })?;
    for (key, color) in colors.entries() {
        validate_css_color(key, color)?;
    }

    Ok((!colors.is_empty()).then_some(colors))
}

/// 读取公开菜单数据；标识不存在或菜单停用时返回 None
pub async fn load_public_menu(state: &AppState, slug: &str) -> AppResult<Option<PublicMenu>> {
    let Some(digital_menu) = DigitalMenuRepository::find_by_slug(&state.db, slug).await? else {
        return Ok(None);
    };
    if !digital_menu.is_active {
        return Ok(None);
    }

    let account_id = digital_menu.pos_account_id.clone();
    let settings = match SettingsRepository::find_by_account(&state.db, &account_id).await? {
        Some(settings) => PublicSettings::from(settings),
        None => {
            let Some(account) = AccountsRepository::find_by_id(&state.db, &account_id).await?
            else {
                return Ok(None);
            };
            PublicSettings {
                restaurant_name: account.restaurant_name,
                address: None,
                phone: None,
                email: None,
                fssai_number: None,
                tax_rate: DEFAULT_TAX_RATE,
                gst_inclusive: true,
            }
        }
    };

    Ok(Some(PublicMenu {
        menu_items: MenuRepository::list(&state.db, &account_id).await?,
        settings,
        theme: AppliedTheme::from_row(
            DigitalMenuRepository::active_theme(&state.db, &account_id).await?,
        ),
        digital_menu,
    }))
}

// ==================== 菜单管理 ====================

/// 初始化数字菜单（重复调用返回已有菜单）
pub async fn initialize_digital_menu(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<InitDigitalMenuArgs>, JsonRejection>,
) -> RpcResult<InitializedMenu> {
    let Json(args) = payload?;
    authorize_existing(&state, &headers, &args.account_id).await?;
    let restaurant_name = require_text("Restaurant name", &args.restaurant_name)?;

    let (digital_menu, created) = DigitalMenuRepository::initialize(
        &state.db,
        &args.account_id,
        &restaurant_name,
        state.now(),
    )
    .await?;
    if created {
        log::info!(
            "账户 {} 创建数字菜单: {}",
            args.account_id,
            digital_menu.public_url_slug
        );
    }

    let public_url = public_menu_url(
        &state.config.server.public_base_url,
        &digital_menu.public_url_slug,
    );
    ok(InitializedMenu {
        digital_menu,
        created,
        public_url,
    })
}

pub async fn get_digital_menu_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<AccountIdArgs>, JsonRejection>,
) -> RpcResult<DigitalMenuSettings> {
    let Json(args) = payload?;
    authorize_account(&state, &headers, &args.account_id)?;

    let digital_menu = DigitalMenuRepository::find_by_account(&state.db, &args.account_id).await?;
    let active_theme = DigitalMenuRepository::active_theme(&state.db, &args.account_id).await?;
    let public_url = digital_menu.as_ref().map(|menu| {
        public_menu_url(&state.config.server.public_base_url, &menu.public_url_slug)
    });

    ok(DigitalMenuSettings {
        digital_menu,
        active_theme,
        public_url,
    })
}

/// 切换主题并可选覆盖颜色，之后只有一个激活主题
pub async fn update_menu_theme(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UpdateThemeArgs>, JsonRejection>,
) -> RpcResult<pos_menu_themes::Model> {
    let Json(args) = payload?;
    authorize_existing(&state, &headers, &args.account_id).await?;

    let theme_name = args.theme_name.trim();
    let theme = find_theme(theme_name)
        .ok_or_else(|| AppError::rejected(format!("Unknown theme: {}", theme_name)))?;
    let custom_colors = parse_custom_colors(args.custom_colors)?;

    let row = DigitalMenuRepository::set_theme(
        &state.db,
        &args.account_id,
        theme.name,
        custom_colors,
        state.now(),
    )
    .await?;
    log::info!("账户 {} 切换菜单主题为 {}", args.account_id, theme.name);

    ok(row)
}

pub async fn set_digital_menu_active(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SetMenuActiveArgs>, JsonRejection>,
) -> RpcResult<pos_digital_menus::Model> {
    let Json(args) = payload?;
    authorize_account(&state, &headers, &args.account_id)?;

    let menu = DigitalMenuRepository::find_by_account(&state.db, &args.account_id)
        .await?
        .ok_or_else(menu_not_initialized)?;
    let menu =
        DigitalMenuRepository::set_active(&state.db, menu, args.is_active, state.now()).await?;
    log::info!(
        "数字菜单 {} 已{}",
        menu.public_url_slug,
        if menu.is_active { "启用" } else { "停用" }
    );

    ok(menu)
}

// ==================== 公开访问 ====================

/// 公开菜单数据（无需登录）
pub async fn get_public_menu(
    State(state): State<AppState>,
    payload: Result<Json<PublicMenuArgs>, JsonRejection>,
) -> RpcResult<PublicMenu> {
    let Json(args) = payload?;

    let menu = load_public_menu(&state, args.slug.trim())
        .await?
        .ok_or_else(|| AppError::rejected("Menu not found or inactive"))?;
    ok(menu)
}

pub async fn list_menu_themes() -> RpcResult<&'static [Theme]> {
    ok(&THEMES[..])
}

/// `GET /menu/{slug}` 公开菜单页面
pub async fn public_menu_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    filter: Result<Query<MenuFilter>, QueryRejection>,
) -> AppResult<(StatusCode, Html<String>)> {
    let filter = filter.map(|Query(f)| f).unwrap_or_default();

    match load_public_menu(&state, &slug).await? {
        Some(menu) => Ok((StatusCode::OK, Html(render_menu_page(&menu, &filter)))),
        None => {
            log::debug!("公开菜单不存在或已停用: {}", slug);
            Ok((StatusCode::NOT_FOUND, Html(render_not_found_page())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_or_null_colors_mean_none() {
        assert_eq!(parse_custom_colors(None).unwrap(), None);
        assert_eq!(parse_custom_colors(Some(json!(null))).unwrap(), None);
        assert_eq!(parse_custom_colors(Some(json!({}))).unwrap(), None);
    }

    #[test]
    fn known_keys_are_kept() {
        let colors = parse_custom_colors(Some(json!({
            "primary": "#ff6600",
            "textSecondary": "hsl(0, 0%, 40%)"
        })))
        .unwrap()
        .unwrap();

        assert_eq!(colors.primary.as_deref(), Some("#ff6600"));
        assert_eq!(colors.text_secondary.as_deref(), Some("hsl(0, 0%, 40%)"));
    }

    #[test]
    fn unknown_keys_and_unsafe_values_are_rejected() {
        assert!(matches!(
            parse_custom_colors(Some(json!({ "shadow": "#000" }))),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_custom_colors(Some(json!({ "primary": "red;}body{display:none" }))),
            Err(AppError::Validation(_))
        ));
    }
}
