use std::sync::Arc;
use std::time::Duration;

use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::reports::ReportClock;
use crate::session::SessionStore;

/// 所有处理函数共享的状态
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let ttl = Duration::from_secs(config.auth.session_ttl_minutes.saturating_mul(60));
        Self {
            db,
            config: Arc::new(config),
            sessions: SessionStore::new(ttl),
        }
    }

    /// 当前 Unix 时间戳（秒）
    pub fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    /// 按配置时区划分日期的报表时钟
    pub fn clock(&self) -> ReportClock {
        ReportClock::new(self.config.report_offset())
    }
}
