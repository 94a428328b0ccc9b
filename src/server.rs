//! HTTP 路由与服务启动

use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use serde::Serialize;
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::database::service::{admin, digital_menu, exports, pos};
use crate::envelope::{RpcResult, ok};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// 过期会话清理间隔
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: bool,
}

async fn health(State(state): State<AppState>) -> RpcResult<HealthStatus> {
    let database = match state.db.ping().await {
        Ok(()) => true,
        Err(e) => {
            log::error!("数据库健康检查失败: {}", e);
            false
        }
    };
    ok(HealthStatus {
        status: if database { "ok" } else { "degraded" },
        database,
    })
}

async fn not_found() -> AppError {
    AppError::NotFound
}

/// `POST /rpc/<name>` 过程路由
fn rpc_routes() -> Router<AppState> {
    Router::new()
        // 管理后台
        .route("/admin_login", post(admin::admin_login))
        .route("/create_pos_account", post(admin::create_pos_account))
        .route("/get_pos_accounts", post(admin::get_pos_accounts))
        .route("/search_pos_accounts", post(admin::search_pos_accounts))
        .route("/toggle_pos_account_status", post(admin::toggle_pos_account_status))
        .route("/extend_pos_license", post(admin::extend_pos_license))
        .route("/get_account_full_details", post(admin::get_account_full_details))
        .route("/get_account_menu", post(admin::get_account_menu))
        .route("/get_account_orders", post(admin::get_account_orders))
        .route("/get_account_analytics", post(admin::get_account_analytics))
        .route("/get_admin_settings", post(admin::get_admin_settings))
        .route("/upsert_admin_setting", post(admin::upsert_admin_setting))
        .route("/get_log_level", post(admin::get_log_level))
        .route("/set_log_level", post(admin::set_log_level))
        .route("/backup_database", post(admin::backup_database))
        // POS
        .route("/pos_login", post(pos::pos_login))
        .route("/logout", post(pos::logout))
        .route("/get_pos_settings", post(pos::get_pos_settings))
        .route("/upsert_pos_settings", post(pos::upsert_pos_settings))
        .route("/get_categories", post(pos::get_categories))
        .route("/upsert_categories", post(pos::upsert_categories))
        .route("/list_menu_items", post(pos::list_menu_items))
        .route("/upsert_menu_item", post(pos::upsert_menu_item))
        .route("/delete_menu_item", post(pos::delete_menu_item))
        .route("/create_order", post(pos::create_order))
        .route("/update_pos_telemetry", post(pos::update_pos_telemetry))
        .route("/get_orders", post(pos::get_orders))
        .route("/can_edit_order", post(pos::can_edit_order))
        .route("/update_order_payment_method", post(pos::update_order_payment_method))
        .route("/get_item_sales", post(pos::get_item_sales))
        .route("/get_sales_overview", post(pos::get_sales_overview))
        // 数字菜单
        .route("/initialize_digital_menu", post(digital_menu::initialize_digital_menu))
        .route("/get_digital_menu_settings", post(digital_menu::get_digital_menu_settings))
        .route("/update_menu_theme", post(digital_menu::update_menu_theme))
        .route("/set_digital_menu_active", post(digital_menu::set_digital_menu_active))
        .route("/get_public_menu", post(digital_menu::get_public_menu))
        .route("/list_menu_themes", post(digital_menu::list_menu_themes))
}

/// `GET /export/...` 下载路由
fn export_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/{order_id}/receipt.pdf", get(exports::export_receipt))
        .route("/reports/daily.pdf", get(exports::export_daily_report))
        .route("/reports/weekly.pdf", get(exports::export_weekly_report))
        .route("/reports/monthly.pdf", get(exports::export_monthly_report))
        .route("/reports/yearly.pdf", get(exports::export_yearly_report))
        .route(
            "/reports/payment-methods.pdf",
            get(exports::export_payment_methods_report),
        )
        .route("/reports/item-wise.pdf", get(exports::export_item_wise_report))
        .route("/menu.pdf", get(exports::export_menu_pdf))
        .route("/menu-qr.svg", get(exports::export_menu_qr))
}

/// 组装完整路由
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .nest("/rpc", rpc_routes())
        .nest("/export", export_routes())
        .route("/menu/{slug}", get(digital_menu::public_menu_page))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// 定期清理过期会话
pub fn spawn_session_purger(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            let purged = state.sessions.purge_expired();
            if purged > 0 {
                log::debug!("清理了 {} 个过期会话", purged);
            }
        }
    })
}

/// 绑定地址并运行，直到收到退出信号
pub async fn serve(state: AppState) -> AppResult<()> {
    let address = state.config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    log::info!("服务已启动: http://{}", address);

    let purger = spawn_session_purger(state.clone());
    let result = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;
    purger.abort();

    result?;
    log::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => log::info!("收到 Ctrl+C，准备退出"),
            Err(e) => {
                log::error!("无法监听 Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                log::info!("收到 SIGTERM，准备退出");
            }
            Err(e) => {
                log::error!("无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
