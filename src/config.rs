//! 应用配置
//!
//! 加载顺序：
//! 1. `RESTO_POS_CONFIG` 指定的 TOML 文件，否则数据目录下的 config.toml（存在时）
//! 2. 缺省项使用内置默认值
//! 3. `RESTO_POS_*` 环境变量覆盖文件中的值
//! 4. `validate()` 校验

use std::path::{Path, PathBuf};

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, AppResult};
use crate::session::MAX_SESSION_TTL_MINUTES;
use crate::utils::logs::parse_level_filter;
use crate::utils::validation::MAX_LICENSE_DAYS;

pub const CONFIG_PATH_ENV: &str = "RESTO_POS_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub license: LicenseConfig,
    pub reports: ReportsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 公开菜单链接和二维码使用的对外地址
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 为空时使用数据目录下的 SQLite 文件
    pub url: Option<String>,
    /// 为空时使用数据目录下的 backups
    pub backup_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub session_ttl_minutes: u64,
    /// 首次启动且没有超级管理员时自动创建
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_minutes: 12 * 60,
            admin_username: None,
            admin_password: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    pub default_duration_days: i64,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            default_duration_days: 365,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// 报表按天分组使用的时区偏移（分钟），默认 IST (+05:30)
    pub utc_offset_minutes: i32,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// 按默认顺序加载配置（文件 + 环境变量）
    pub fn load() -> AppResult<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => match resto_path::get_config_path() {
                Ok(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件载入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let content = std::fs::read_to_string(&path)?;
        log::info!("载入配置文件: {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("TOML parsing error: {}", e)))
    }

    /// 用 `RESTO_POS_*` 变量覆盖配置，`lookup` 便于测试时注入
    pub fn apply_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("RESTO_POS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("RESTO_POS_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| AppError::Config(format!("RESTO_POS_PORT: {}", e)))?;
        }
        if let Some(url) = lookup("RESTO_POS_DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(dir) = lookup("RESTO_POS_BACKUP_DIR") {
            self.database.backup_dir = Some(dir);
        }
        if let Some(base) = lookup("RESTO_POS_PUBLIC_BASE_URL") {
            self.server.public_base_url = base;
        }
        if let Some(level) = lookup("RESTO_POS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(username) = lookup("RESTO_POS_ADMIN_USERNAME") {
            self.auth.admin_username = Some(username);
        }
        if let Some(password) = lookup("RESTO_POS_ADMIN_PASSWORD") {
            self.auth.admin_password = Some(password);
        }
        Ok(())
    }

    /// 校验配置的合理性
    pub fn validate(&self) -> AppResult<()> {
        if self.server.port == 0 {
            return Err(AppError::Config("server.port must not be 0".to_string()));
        }
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&self.auth.session_ttl_minutes) {
            return Err(AppError::Config(format!(
                "auth.session_ttl_minutes must be between 1 and {}",
                MAX_SESSION_TTL_MINUTES
            )));
        }
        if !(1..=MAX_LICENSE_DAYS).contains(&self.license.default_duration_days) {
            return Err(AppError::Config(format!(
                "license.default_duration_days must be between 1 and {}",
                MAX_LICENSE_DAYS
            )));
        }
        if self.reports.utc_offset_minutes.abs() > 14 * 60 {
            return Err(AppError::Config(format!(
                "reports.utc_offset_minutes out of range: {}",
                self.reports.utc_offset_minutes
            )));
        }
        if parse_level_filter(&self.logging.level).is_none() {
            return Err(AppError::Config(format!(
                "logging.level is not a valid level: {}",
                self.logging.level
            )));
        }
        match Url::parse(&self.server.public_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(AppError::Config(format!(
                    "server.public_base_url is not an http(s) URL: {}",
                    self.server.public_base_url
                )));
            }
        }
        Ok(())
    }

    /// 解析数据库连接字符串
    ///
    /// 未配置时使用 resto-path 解析的数据库文件（自动判断便携模式）
    pub fn database_url(&self) -> AppResult<String> {
        if let Some(url) = &self.database.url {
            return Ok(url.clone());
        }

        let db_path = resto_path::get_db_path().map_err(AppError::Config)?;
        let file_url = Url::from_file_path(&db_path).map_err(|_| {
            AppError::Config(format!("Invalid database path: {}", db_path.display()))
        })?;
        Ok(format!("sqlite:{}?mode=rwc", file_url.path()))
    }

    pub fn backup_dir(&self) -> AppResult<PathBuf> {
        match &self.database.backup_dir {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => resto_path::get_default_backup_dir().map_err(AppError::Config),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 报表时区；`validate()` 已保证偏移合法
    pub fn report_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.reports.utc_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix())
    }

    pub fn log_level(&self) -> log::LevelFilter {
        parse_level_filter(&self.logging.level).unwrap_or(log::LevelFilter::Info)
    }
}
