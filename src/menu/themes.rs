//! 公开菜单主题表
//!
//! 每个主题包含配色、字体、间距、圆角、阴影，以及决定页面排版方式的展示属性。

use serde::Serialize;

use crate::entity::custom_colors::CustomColors;

/// 未设置或无法识别主题时使用
pub const DEFAULT_THEME: &str = "modern";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Grid,
    List,
    Table,
    Masonry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Compact,
    Comfortable,
    Spacious,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSize {
    Small,
    Medium,
    Large,
    Xl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    Rounded,
    Circle,
    Square,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStyle {
    Simple,
    Detailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeColors {
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub text_secondary: &'static str,
    pub border: &'static str,
    pub accent: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeFonts {
    pub heading: &'static str,
    pub body: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeSpacing {
    pub card: &'static str,
    pub section: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeShadows {
    pub card: &'static str,
    pub button: &'static str,
}

/// 展示属性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Presentation {
    pub layout: Layout,
    pub density: Density,
    pub icon_size: IconSize,
    pub image_style: ImageStyle,
    pub item_style: ItemStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub name: &'static str,
    pub display_name: &'static str,
    pub colors: ThemeColors,
    pub fonts: ThemeFonts,
    pub spacing: ThemeSpacing,
    pub border_radius: &'static str,
    pub shadows: ThemeShadows,
    pub presentation: Presentation,
}

const fn colors(c: [&'static str; 8]) -> ThemeColors {
    ThemeColors {
        primary: c[0],
        secondary: c[1],
        background: c[2],
        surface: c[3],
        text: c[4],
        text_secondary: c[5],
        border: c[6],
        accent: c[7],
    }
}

const fn presentation(
    layout: Layout,
    density: Density,
    icon_size: IconSize,
    image_style: ImageStyle,
    item_style: ItemStyle,
) -> Presentation {
    Presentation {
        layout,
        density,
        icon_size,
        image_style,
        item_style,
    }
}

pub static THEMES: [Theme; 10] = [
    Theme {
        name: "modern",
        display_name: "Modern",
        colors: colors([
            "hsl(220, 70%, 50%)",
            "hsl(220, 60%, 96%)",
            "hsl(0, 0%, 100%)",
            "hsl(220, 14%, 96%)",
            "hsl(220, 13%, 13%)",
            "hsl(220, 9%, 46%)",
            "hsl(220, 13%, 91%)",
            "hsl(220, 70%, 60%)",
        ]),
        fonts: ThemeFonts {
            heading: "Inter, sans-serif",
            body: "Inter, sans-serif",
        },
        spacing: ThemeSpacing {
            card: "1.5rem",
            section: "2rem",
        },
        border_radius: "0.75rem",
        shadows: ThemeShadows {
            card: "0 4px 6px -1px rgba(0, 0, 0, 0.1)",
            button: "0 2px 4px -1px rgba(0, 0, 0, 0.1)",
        },
        presentation: presentation(
            Layout::Grid,
            Density::Comfortable,
            IconSize::Medium,
            ImageStyle::Rounded,
            ItemStyle::Simple,
        ),
    },
    Theme {
        name: "classic",
        display_name: "Classic",
        colors: colors([
            "hsl(45, 100%, 35%)",
            "hsl(45, 100%, 95%)",
            "hsl(50, 44%, 96%)",
            "hsl(0, 0%, 100%)",
            "hsl(30, 25%, 8%)",
            "hsl(30, 10%, 40%)",
            "hsl(45, 20%, 85%)",
            "hsl(45, 100%, 45%)",
        ]),
        fonts: ThemeFonts {
            heading: "Georgia, serif",
            body: "Georgia, serif",
        },
        spacing: ThemeSpacing {
            card: "1.25rem",
            section: "1.75rem",
        },
        border_radius: "0.5rem",
        shadows: ThemeShadows {
            card: "0 2px 8px rgba(0, 0, 0, 0.1)",
            button: "0 1px 3px rgba(0, 0, 0, 0.2)",
        },
        presentation: presentation(
            Layout::List,
            Density::Comfortable,
            IconSize::Medium,
            ImageStyle::Rounded,
            ItemStyle::Detailed,
        ),
    },
    Theme {
        name: "colorful",
        display_name: "Colorful",
        colors: colors([
            "hsl(280, 100%, 60%)",
            "hsl(280, 100%, 95%)",
            "hsl(320, 100%, 98%)",
            "hsl(0, 0%, 100%)",
            "hsl(260, 15%, 15%)",
            "hsl(260, 10%, 45%)",
            "hsl(280, 30%, 90%)",
            "hsl(180, 100%, 50%)",
        ]),
        fonts: ThemeFonts {
            heading: "Poppins, sans-serif",
            body: "Poppins, sans-serif",
        },
        spacing: ThemeSpacing {
            card: "1.5rem",
            section: "2rem",
        },
        border_radius: "1rem",
        shadows: ThemeShadows {
            card: "0 8px 25px rgba(128, 0, 128, 0.15)",
            button: "0 4px 15px rgba(128, 0, 128, 0.2)",
        },
        presentation: presentation(
            Layout::Masonry,
            Density::Spacious,
            IconSize::Large,
            ImageStyle::Rounded,
            ItemStyle::Detailed,
        ),
    },
    Theme {
        name: "minimal",
        display_name: "Minimal",
        colors: colors([
            "hsl(0, 0%, 9%)",
            "hsl(0, 0%, 96%)",
            "hsl(0, 0%, 100%)",
            "hsl(0, 0%, 99%)",
            "hsl(0, 0%, 9%)",
            "hsl(0, 0%, 45%)",
            "hsl(0, 0%, 90%)",
            "hsl(0, 0%, 20%)",
        ]),
        fonts: ThemeFonts {
            heading: "Helvetica, Arial, sans-serif",
            body: "Helvetica, Arial, sans-serif",
        },
        spacing: ThemeSpacing {
            card: "1rem",
            section: "1.5rem",
        },
        border_radius: "0.25rem",
        shadows: ThemeShadows {
            card: "0 1px 3px rgba(0, 0, 0, 0.05)",
            button: "0 1px 2px rgba(0, 0, 0, 0.1)",
        },
        presentation: presentation(
            Layout::List,
            Density::Compact,
            IconSize::Small,
            ImageStyle::None,
            ItemStyle::Simple,
        ),
    },
    Theme {
        name: "elegant",
        display_name: "Elegant",
        colors: colors([
            "hsl(210, 40%, 20%)",
            "hsl(210, 40%, 95%)",
            "hsl(210, 30%, 98%)",
            "hsl(0, 0%, 100%)",
            "hsl(210, 30%, 15%)",
            "hsl(210, 15%, 50%)",
            "hsl(210, 20%, 85%)",
            "hsl(35, 80%, 60%)",
        ]),
        fonts: ThemeFonts {
            heading: "Playfair Display, serif",
            body: "Source Sans Pro, sans-serif",
        },
        spacing: ThemeSpacing {
            card: "2rem",
            section: "2.5rem",
        },
        border_radius: "0.5rem",
        shadows: ThemeShadows {
            card: "0 4px 20px rgba(0, 0, 0, 0.08)",
            button: "0 2px 10px rgba(0, 0, 0, 0.1)",
        },
        presentation: presentation(
            Layout::List,
            Density::Spacious,
            IconSize::Large,
            ImageStyle::Circle,
            ItemStyle::Detailed,
        ),
    },
    Theme {
        name: "fun",
        display_name: "Fun",
        colors: colors([
            "hsl(340, 100%, 50%)",
            "hsl(340, 100%, 95%)",
            "hsl(50, 100%, 98%)",
            "hsl(0, 0%, 100%)",
            "hsl(260, 15%, 15%)",
            "hsl(260, 10%, 45%)",
            "hsl(340, 30%, 90%)",
            "hsl(60, 100%, 50%)",
        ]),
        fonts: ThemeFonts {
            heading: "Comic Neue, cursive",
            body: "Nunito, sans-serif",
        },
        spacing: ThemeSpacing {
            card: "1.5rem",
            section: "2rem",
        },
        border_radius: "1.5rem",
        shadows: ThemeShadows {
            card: "0 8px 25px rgba(255, 20, 147, 0.15)",
            button: "0 4px 15px rgba(255, 20, 147, 0.2)",
        },
        presentation: presentation(
            Layout::Masonry,
            Density::Comfortable,
            IconSize::Large,
            ImageStyle::Circle,
            ItemStyle::Detailed,
        ),
    },
    Theme {
        name: "natural",
        display_name: "Natural",
        colors: colors([
            "hsl(120, 40%, 35%)",
            "hsl(120, 40%, 95%)",
            "hsl(60, 30%, 96%)",
            "hsl(0, 0%, 100%)",
            "hsl(30, 25%, 15%)",
            "hsl(30, 15%, 45%)",
            "hsl(120, 20%, 85%)",
            "hsl(25, 80%, 55%)",
        ]),
        fonts: ThemeFonts {
            heading: "Merriweather, serif",
            body: "Open Sans, sans-serif",
        },
        spacing: ThemeSpacing {
            card: "1.5rem",
            section: "2rem",
        },
        border_radius: "0.75rem",
        shadows: ThemeShadows {
            card: "0 4px 15px rgba(34, 139, 34, 0.1)",
            button: "0 2px 8px rgba(34, 139, 34, 0.15)",
        },
        presentation: presentation(
            Layout::Grid,
            Density::Comfortable,
            IconSize::Medium,
            ImageStyle::Rounded,
            ItemStyle::Detailed,
        ),
    },
    Theme {
        name: "tech",
        display_name: "Tech",
        colors: colors([
            "hsl(200, 100%, 50%)",
            "hsl(220, 30%, 15%)",
            "hsl(220, 30%, 8%)",
            "hsl(220, 25%, 12%)",
            "hsl(0, 0%, 95%)",
            "hsl(0, 0%, 70%)",
            "hsl(220, 20%, 20%)",
            "hsl(180, 100%, 50%)",
        ]),
        fonts: ThemeFonts {
            heading: "Orbitron, sans-serif",
            body: "Roboto, sans-serif",
        },
        spacing: ThemeSpacing {
            card: "1.5rem",
            section: "2rem",
        },
        border_radius: "0.5rem",
        shadows: ThemeShadows {
            card: "0 4px 20px rgba(0, 191, 255, 0.2)",
            button: "0 2px 10px rgba(0, 191, 255, 0.3)",
        },
        presentation: presentation(
            Layout::Table,
            Density::Compact,
            IconSize::Small,
            ImageStyle::Square,
            ItemStyle::Simple,
        ),
    },
    Theme {
        name: "vintage",
        display_name: "Vintage",
        colors: colors([
            "hsl(25, 60%, 45%)",
            "hsl(25, 60%, 90%)",
            "hsl(40, 40%, 94%)",
            "hsl(40, 30%, 98%)",
            "hsl(25, 30%, 20%)",
            "hsl(25, 20%, 45%)",
            "hsl(25, 30%, 80%)",
            "hsl(5, 70%, 50%)",
        ]),
        fonts: ThemeFonts {
            heading: "Abril Fatface, cursive",
            body: "Crimson Text, serif",
        },
        spacing: ThemeSpacing {
            card: "1.5rem",
            section: "2rem",
        },
        border_radius: "0.5rem",
        shadows: ThemeShadows {
            card: "0 4px 15px rgba(139, 69, 19, 0.15)",
            button: "0 2px 8px rgba(139, 69, 19, 0.2)",
        },
        presentation: presentation(
            Layout::Table,
            Density::Comfortable,
            IconSize::Medium,
            ImageStyle::Rounded,
            ItemStyle::Detailed,
        ),
    },
    Theme {
        name: "professional",
        display_name: "Professional",
        colors: colors([
            "hsl(210, 100%, 35%)",
            "hsl(210, 100%, 95%)",
            "hsl(210, 20%, 98%)",
            "hsl(0, 0%, 100%)",
            "hsl(210, 20%, 15%)",
            "hsl(210, 15%, 45%)",
            "hsl(210, 15%, 88%)",
            "hsl(210, 100%, 45%)",
        ]),
        fonts: ThemeFonts {
            heading: "Roboto, sans-serif",
            body: "Roboto, sans-serif",
        },
        spacing: ThemeSpacing {
            card: "1.25rem",
            section: "1.75rem",
        },
        border_radius: "0.375rem",
        shadows: ThemeShadows {
            card: "0 2px 10px rgba(0, 0, 0, 0.08)",
            button: "0 1px 5px rgba(0, 0, 0, 0.1)",
        },
        presentation: presentation(
            Layout::Table,
            Density::Compact,
            IconSize::Small,
            ImageStyle::None,
            ItemStyle::Detailed,
        ),
    },
];

/// 按名称查找主题
pub fn find_theme(name: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|theme| theme.name == name)
}

/// 按名称查找主题，找不到时回退到默认主题
pub fn resolve_theme(name: &str) -> &'static Theme {
    find_theme(name).unwrap_or(&THEMES[0])
}

impl Theme {
    /// 合并自定义颜色后的配色（自定义值优先）
    pub fn colors_with(&self, custom: Option<&CustomColors>) -> [(&'static str, String); 8] {
        let pick = |base: &'static str, over: Option<&String>| {
            over.cloned().unwrap_or_else(|| base.to_string())
        };
        let c = &self.colors;
        let o = custom.cloned().unwrap_or_default();
        [
            ("primary", pick(c.primary, o.primary.as_ref())),
            ("secondary", pick(c.secondary, o.secondary.as_ref())),
            ("background", pick(c.background, o.background.as_ref())),
            ("surface", pick(c.surface, o.surface.as_ref())),
            ("text", pick(c.text, o.text.as_ref())),
            ("text-secondary", pick(c.text_secondary, o.text_secondary.as_ref())),
            ("border", pick(c.border, o.border.as_ref())),
            ("accent", pick(c.accent, o.accent.as_ref())),
        ]
    }

    /// 页面使用的 CSS 变量 `--menu-*`
    pub fn css_variables(&self, custom: Option<&CustomColors>) -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = self
            .colors_with(custom)
            .into_iter()
            .map(|(key, value)| (format!("--menu-{}", key), value))
            .collect();

        let fixed = [
            ("--menu-font-heading", self.fonts.heading),
            ("--menu-font-body", self.fonts.body),
            ("--menu-card-padding", self.spacing.card),
            ("--menu-section-padding", self.spacing.section),
            ("--menu-border-radius", self.border_radius),
            ("--menu-shadow-card", self.shadows.card),
            ("--menu-shadow-button", self.shadows.button),
        ];
        vars.extend(
            fixed
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        );
        vars
    }
}
