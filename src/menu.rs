//! 公开数字菜单：主题、排版与页面渲染

pub mod layouts;
pub mod render;
pub mod slug;
pub mod themes;

use serde::{Deserialize, Serialize};

use crate::entity::{
    custom_colors::CustomColors, pos_digital_menus, pos_menu_items, pos_menu_themes,
    pos_settings,
};
use themes::{DEFAULT_THEME, Theme, resolve_theme};

/// 公开页面可见的餐厅信息
///
/// 开启隐私模式时不公开电话和邮箱。
#[derive(Debug, Clone, Serialize)]
pub struct PublicSettings {
    pub restaurant_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub fssai_number: Option<String>,
    pub tax_rate: f64,
    pub gst_inclusive: bool,
}

impl From<pos_settings::Model> for PublicSettings {
    fn from(settings: pos_settings::Model) -> Self {
        let private = settings.privacy_mode;
        Self {
            restaurant_name: settings.restaurant_name,
            address: settings.address,
            phone: if private { None } else { settings.phone },
            email: if private { None } else { settings.email },
            fssai_number: settings.fssai_number,
            tax_rate: settings.tax_rate,
            gst_inclusive: settings.gst_inclusive,
        }
    }
}

impl PublicSettings {
    /// 价格已含税且税率为正时显示 "Incl. GST"
    pub fn shows_gst_badge(&self) -> bool {
        self.gst_inclusive && self.tax_rate > 0.0
    }
}

/// 当前主题及其自定义颜色
#[derive(Debug, Clone, Serialize)]
pub struct AppliedTheme {
    pub theme_name: String,
    pub custom_colors: Option<CustomColors>,
    pub definition: &'static Theme,
}

impl AppliedTheme {
    /// 无法识别的主题名回退到默认主题
    pub fn from_row(row: Option<pos_menu_themes::Model>) -> Self {
        match row {
            Some(row) => {
                let definition = resolve_theme(&row.theme_name);
                Self {
                    theme_name: definition.name.to_string(),
                    custom_colors: row.custom_colors,
                    definition,
                }
            }
            None => Self {
                theme_name: DEFAULT_THEME.to_string(),
                custom_colors: None,
                definition: resolve_theme(DEFAULT_THEME),
            },
        }
    }

    pub fn css_variables(&self) -> Vec<(String, String)> {
        self.definition.css_variables(self.custom_colors.as_ref())
    }
}

/// 公开菜单数据
#[derive(Debug, Clone, Serialize)]
pub struct PublicMenu {
    pub menu_items: Vec<pos_menu_items::Model>,
    pub settings: PublicSettings,
    pub theme: AppliedTheme,
    pub digital_menu: pos_digital_menus::Model,
}

impl PublicMenu {
    /// 分类按首次出现的顺序
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.menu_items {
            if !seen.contains(&item.category.as_str()) {
                seen.push(&item.category);
            }
        }
        seen
    }
}

/// 页面上的搜索与分类筛选
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuFilter {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl MenuFilter {
    fn search_term(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }

    /// "All" 或空值表示不过滤
    pub fn selected_category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != "All")
    }

    /// 分类精确匹配，名称不区分大小写子串匹配
    pub fn apply<'a>(&self, items: &'a [pos_menu_items::Model]) -> Vec<&'a pos_menu_items::Model> {
        let term = self.search_term();
        let category = self.selected_category();
        items
            .iter()
            .filter(|item| category.is_none_or(|c| item.category == c))
            .filter(|item| {
                term.as_deref()
                    .is_none_or(|t| item.name.to_lowercase().contains(t))
            })
            .collect()
    }
}

/// 按分类分组，保持首次出现的顺序
pub fn group_by_category<'a>(
    items: &[&'a pos_menu_items::Model],
) -> Vec<(&'a str, Vec<&'a pos_menu_items::Model>)> {
    let mut groups: Vec<(&'a str, Vec<&'a pos_menu_items::Model>)> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|(name, _)| *name == item.category) {
            Some((_, list)) => list.push(item),
            None => groups.push((item.category.as_str(), vec![*item])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, category: &str) -> pos_menu_items::Model {
        pos_menu_items::Model {
            id: name.to_string(),
            pos_account_id: "a1".to_string(),
            name: name.to_string(),
            price: 100.0,
            category: category.to_string(),
            image: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn filter_by_category_and_search() {
        let items = vec![
            item("Classic Burger", "Mains"),
            item("Coca Cola", "Beverages"),
            item("Veg Burger", "Mains"),
        ];

        let all = MenuFilter::default().apply(&items);
        assert_eq!(all.len(), 3);

        let filter = MenuFilter {
            q: Some("BURGER".to_string()),
            category: None,
        };
        assert_eq!(filter.apply(&items).len(), 2);

        let filter = MenuFilter {
            q: Some("burger".to_string()),
            category: Some("Beverages".to_string()),
        };
        assert!(filter.apply(&items).is_empty());

        let filter = MenuFilter {
            q: None,
            category: Some("All".to_string()),
        };
        assert_eq!(filter.apply(&items).len(), 3);
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let items = vec![
            item("Coca Cola", "Beverages"),
            item("Classic Burger", "Mains"),
            item("Lassi", "Beverages"),
        ];
        let refs: Vec<&pos_menu_items::Model> = items.iter().collect();
        let groups = group_by_category(&refs);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Beverages");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, "Mains");
    }

    #[test]
    fn unknown_theme_row_falls_back() {
        let applied = AppliedTheme::from_row(None);
        assert_eq!(applied.theme_name, "modern");
    }
}
