//! 主题自定义颜色 JSON 结构体
//!
//! 存储在 pos_menu_themes.custom_colors 列中，只允许覆盖主题已有的颜色键。

use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// 自定义颜色覆盖（所有字段可选）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default, FromJsonQueryResult)]
#[serde(default, deny_unknown_fields)]
pub struct CustomColors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surface: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(alias = "textSecondary", skip_serializing_if = "Option::is_none")]
    pub text_secondary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
}

impl CustomColors {
    /// 以 (键, 值) 形式遍历已设置的颜色
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("background", &self.background),
            ("surface", &self.surface),
            ("text", &self.text),
            ("text_secondary", &self.text_secondary),
            ("border", &self.border),
            ("accent", &self.accent),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}
