use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{AppError, AppResult};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl From<log::LevelFilter> for LogLevel {
    fn from(level: log::LevelFilter) -> Self {
        match level {
            log::LevelFilter::Error => LogLevel::Error,
            log::LevelFilter::Warn => LogLevel::Warn,
            log::LevelFilter::Info => LogLevel::Info,
            log::LevelFilter::Debug => LogLevel::Debug,
            log::LevelFilter::Trace => LogLevel::Trace,
            log::LevelFilter::Off => LogLevel::Off,
        }
    }
}

/// 解析日志级别名称（不区分大小写）
pub fn parse_level_filter(level: &str) -> Option<log::LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "error" => Some(log::LevelFilter::Error),
        "warn" => Some(log::LevelFilter::Warn),
        "info" => Some(log::LevelFilter::Info),
        "debug" => Some(log::LevelFilter::Debug),
        "trace" => Some(log::LevelFilter::Trace),
        "off" => Some(log::LevelFilter::Off),
        _ => None,
    }
}

/// 初始化日志订阅器
///
/// `log` 宏经 tracing-log 桥接进入 fmt 订阅器。订阅器本身放开到 trace，
/// 实际输出级别由 `log::set_max_level` 控制，以便运行时动态调整。
pub fn init_logger(level: log::LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trace,sqlx=warn,hyper=info,tower_http=debug"));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();

    if result.is_err() {
        // 测试中可能重复初始化
        log::debug!("日志订阅器已初始化，跳过");
    }

    log::set_max_level(level);
}

/// 动态设置日志输出级别（不持久化）
pub fn set_log_level(level: &str) -> AppResult<LogLevel> {
    let lf = parse_level_filter(level)
        .ok_or_else(|| AppError::validation(format!("Invalid log level: {}", level)))?;
    log::set_max_level(lf);
    log::info!("日志级别已调整为 {}", lf);
    Ok(lf.into())
}

/// 获取当前日志级别
pub fn get_log_level() -> LogLevel {
    log::max_level().into()
}
