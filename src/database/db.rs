use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, RuntimeErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// 数据库备份结果
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupResult {
    pub path: String,
    pub message: String,
}

// ==================== 数据库连接管理 ====================

/// 从 `sqlite:` 连接串中取出数据库文件路径（内存库返回 None）
fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("sqlite:")?;
    let path = rest.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(':') {
        return None;
    }
    Url::parse(&format!("file://{}", path))
        .ok()
        .and_then(|u| u.to_file_path().ok())
        .or_else(|| Some(PathBuf::from(path)))
}

/// Establish a SeaORM database connection.
///
/// SQLite 使用单连接池，所有写操作串行化；连接建立后开启外键约束，
/// 否则级联删除不会生效。
pub async fn establish_connection(url: &str) -> Result<DatabaseConnection, DbErr> {
    // 1. 文件数据库：确保目录存在
    if let Some(db_path) = sqlite_file_path(url) {
        if !db_path.exists() {
            if let Some(parent) = db_path.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    DbErr::Conn(RuntimeErr::Internal(format!("无法创建数据库目录: {}", e)))
                })?;
            }
            log::info!("首次启动，创建数据库: {}", db_path.display());
        } else {
            log::info!("使用数据库: {}", db_path.display());
        }
    } else {
        log::info!("使用数据库: {}", url);
    }

    // 2. 设置连接选项
    let mut options = ConnectOptions::new(url.to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    // 3. 连接数据库并开启外键
    let conn = Database::connect(options).await?;
    conn.execute_unprepared("PRAGMA foreign_keys = ON").await?;

    Ok(conn)
}

/// 关闭数据库连接
pub async fn close_connection(conn: DatabaseConnection) -> Result<(), DbErr> {
    conn.close().await?;
    Ok(())
}

// ==================== 数据库备份 ====================

/// 生成带时间戳的备份文件名
fn generate_backup_filename() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    format!("resto_pos_{}.db", timestamp)
}

/// 使用 VACUUM INTO 进行数据库热备份
///
/// VACUUM INTO 可以在数据库正在使用时安全地创建一份优化后的副本。
/// 目标目录不存在时会自动创建。
pub async fn backup_database(
    db: &DatabaseConnection,
    backup_dir: &Path,
) -> Result<BackupResult, DbErr> {
    if !backup_dir.exists() {
        fs::create_dir_all(backup_dir).map_err(|e| {
            DbErr::Custom(format!("无法创建备份目录: {}", e))
        })?;
    }

    let target_path = backup_dir.join(generate_backup_filename());

    // SQLite 在 Windows 上也支持正斜杠，使用正斜杠可以避免转义问题
    let target_path_str = target_path
        .to_str()
        .ok_or_else(|| DbErr::Custom("备份路径包含无效字符".to_string()))?
        .replace('\\', "/");

    // 只需要转义单引号
    let escaped_path = target_path_str.replace('\'', "''");
    let vacuum_sql = format!("VACUUM INTO '{}'", escaped_path);

    db.execute_unprepared(&vacuum_sql).await?;

    log::info!("数据库热备份成功: {}", target_path_str);

    Ok(BackupResult {
        path: target_path_str,
        message: "Database backup created".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_urls_have_no_file() {
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/db"), None);
    }

    #[test]
    fn file_urls_resolve_to_paths() {
        assert_eq!(
            sqlite_file_path("sqlite:/var/lib/resto/data/resto_pos.db?mode=rwc"),
            Some(PathBuf::from("/var/lib/resto/data/resto_pos.db"))
        );
        assert_eq!(
            sqlite_file_path("sqlite:///tmp/pos.db"),
            Some(PathBuf::from("/tmp/pos.db"))
        );
    }
}
