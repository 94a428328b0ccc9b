pub mod billing;
pub mod config;
pub mod database;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod export;
pub mod menu;
pub mod reports;
pub mod server;
pub mod session;
pub mod state;
pub mod utils;

use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;

use config::AppConfig;
use database::db::{close_connection, establish_connection};
use database::repository::admin_repository::AdminRepository;
use error::AppResult;
use state::AppState;
use utils::logs::init_logger;
use utils::password::hash_secret;

pub use server::build_router;

/// 没有任何管理员时，用配置中的账号创建第一个管理员
pub async fn bootstrap_admin(db: &DatabaseConnection, config: &AppConfig) -> AppResult<()> {
    if AdminRepository::count_users(db).await? > 0 {
        return Ok(());
    }

    match (&config.auth.admin_username, &config.auth.admin_password) {
        (Some(username), Some(password)) if !username.trim().is_empty() && !password.is_empty() => {
            let now = chrono::Utc::now().timestamp();
            AdminRepository::create_user(
                db,
                username.trim().to_string(),
                hash_secret(password)?,
                now,
            )
            .await?;
            log::info!("已创建初始管理员: {}", username.trim());
        }
        _ => {
            log::warn!(
                "尚未创建管理员，请设置 RESTO_POS_ADMIN_USERNAME 和 RESTO_POS_ADMIN_PASSWORD 后重启"
            );
        }
    }
    Ok(())
}

/// 连接数据库、执行迁移并准备共享状态
pub async fn prepare_state(config: AppConfig) -> AppResult<AppState> {
    let url = config.database_url()?;
    let db = establish_connection(&url).await?;

    Migrator::up(&db, None).await?;
    log::info!("数据库迁移完成");

    bootstrap_admin(&db, &config).await?;
    Ok(AppState::new(db, config))
}

pub async fn run() -> AppResult<()> {
    let config = AppConfig::load()?;
    init_logger(config.log_level());

    let state = prepare_state(config).await?;
    let db = state.db.clone();

    let result = server::serve(state).await;

    if let Err(e) = close_connection(db).await {
        log::error!("关闭数据库连接失败: {}", e);
    }
    result
}
