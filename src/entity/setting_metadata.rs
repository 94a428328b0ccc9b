//! 管理员设置附带的 JSON 元数据
//!
//! 存储在 admin_settings.setting_metadata 列中，结构随设置键而变化，
//! 例如 order_edit_mode 使用 `{"minutes": 30}`。

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, FromJsonQueryResult)]
#[serde(transparent)]
pub struct SettingMetadata(pub Map<String, Value>);

impl SettingMetadata {
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_i64)
    }

    pub fn with_i64(key: &str, value: i64) -> Self {
        let mut map = Map::new();
        map.insert(key.to_string(), Value::from(value));
        Self(map)
    }
}
