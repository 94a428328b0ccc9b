use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "RESTO_POS_DATA_DIR";
pub const DB_DATA_DIR: &str = "data";
pub const DB_FILE_NAME: &str = "resto_pos.db";
pub const DB_BACKUP_SUBDIR: &str = "backups";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const RESOURCE_DIR: &str = "resources";

/// 数据目录来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLocation {
    /// 环境变量 `RESTO_POS_DATA_DIR` 指定
    Override(PathBuf),
    /// 可执行文件旁的 resources 目录
    Portable(PathBuf),
    /// 系统应用数据目录
    System(PathBuf),
}

impl DataLocation {
    pub fn root(&self) -> &Path {
        match self {
            DataLocation::Override(path)
            | DataLocation::Portable(path)
            | DataLocation::System(path) => path,
        }
    }
}

fn portable_root() -> Option<PathBuf> {
    let exe_path = std::env::current_exe().ok()?;
    let root = exe_path.parent()?.join(RESOURCE_DIR);
    root.join(DB_DATA_DIR)
        .join(DB_FILE_NAME)
        .is_file()
        .then_some(root)
}

/// 便携模式：可执行文件旁存在 resources/data/resto_pos.db
pub fn is_portable_mode() -> bool {
    portable_root().is_some()
}

fn system_root() -> Result<PathBuf, String> {
    let base_dirs = directories::BaseDirs::new()
        .ok_or_else(|| "cannot resolve system directories".to_string())?;
    let app_dir = if cfg!(any(target_os = "windows", target_os = "macos")) {
        "com.restopos.server"
    } else {
        "resto-pos"
    };
    Ok(base_dirs.data_dir().join(app_dir))
}

/// 按 环境变量 > 便携模式 > 系统目录 的顺序确定数据目录
pub fn resolve_data_location() -> Result<DataLocation, String> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(DataLocation::Override(PathBuf::from(dir)));
    }
    if let Some(root) = portable_root() {
        return Ok(DataLocation::Portable(root));
    }
    system_root().map(DataLocation::System)
}

pub fn get_base_data_dir() -> Result<PathBuf, String> {
    resolve_data_location().map(|location| location.root().to_path_buf())
}

pub fn db_path_in(root: &Path) -> PathBuf {
    root.join(DB_DATA_DIR).join(DB_FILE_NAME)
}

pub fn backup_dir_in(root: &Path) -> PathBuf {
    root.join(DB_DATA_DIR).join(DB_BACKUP_SUBDIR)
}

/// 数据库文件路径
pub fn get_db_path() -> Result<PathBuf, String> {
    get_base_data_dir().map(|root| db_path_in(&root))
}

/// 默认备份目录（与数据库同在 data 下）
pub fn get_default_backup_dir() -> Result<PathBuf, String> {
    get_base_data_dir().map(|root| backup_dir_in(&root))
}

pub fn get_config_path() -> Result<PathBuf, String> {
    get_base_data_dir().map(|root| root.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_the_root() {
        let root = PathBuf::from("/srv/resto");
        assert_eq!(db_path_in(&root), PathBuf::from("/srv/resto/data/resto_pos.db"));
        assert_eq!(backup_dir_in(&root), PathBuf::from("/srv/resto/data/backups"));
        assert_eq!(
            db_path_in(&root).parent(),
            backup_dir_in(&root).parent()
        );
    }

    #[test]
    fn location_exposes_its_root() {
        let location = DataLocation::Override(PathBuf::from("/tmp/pos"));
        assert_eq!(location.root(), Path::new("/tmp/pos"));
    }
}
