//! 菜单分组的排版策略
//!
//! 主题的 `layout` 属性决定使用哪种实现。

use crate::entity::pos_menu_items;

use super::render::{escape_html, format_price};
use super::themes::{Density, IconSize, ImageStyle, ItemStyle, Layout, Presentation};

/// 渲染一个分组时需要的上下文
#[derive(Debug, Clone, Copy)]
pub struct LayoutContext<'a> {
    pub presentation: &'a Presentation,
    /// 是否在价格旁显示 "Incl. GST"
    pub gst_badge: bool,
}

impl LayoutContext<'_> {
    fn detailed(&self) -> bool {
        self.presentation.item_style == ItemStyle::Detailed
    }

    fn shows_images(&self) -> bool {
        self.presentation.image_style != ImageStyle::None
    }

    fn badge(&self) -> &'static str {
        if self.gst_badge {
            r#"<span class="menu-badge">Incl. GST</span>"#
        } else {
            ""
        }
    }

    /// 菜品图片，没有图片或主题不显示图片时为空
    fn image(&self, item: &pos_menu_items::Model) -> String {
        if !self.shows_images() {
            return String::new();
        }
        let Some(src) = item.image.as_deref().filter(|s| !s.is_empty()) else {
            return String::new();
        };
        let size = icon_size_rem(self.presentation.icon_size);
        format!(
            r#"<img class="menu-image" src="{}" alt="{}" style="width:{size};height:{size};object-fit:cover;border-radius:{}">"#,
            escape_html(src),
            escape_html(&item.name),
            image_radius(self.presentation.image_style),
        )
    }
}

pub trait MenuLayout: Send + Sync {
    fn name(&self) -> &'static str;

    /// 把一个分类下的菜品写入 `out`
    fn render(&self, items: &[&pos_menu_items::Model], ctx: &LayoutContext<'_>, out: &mut String);
}

fn icon_size_rem(size: IconSize) -> &'static str {
    match size {
        IconSize::Small => "3rem",
        IconSize::Medium => "4rem",
        IconSize::Large => "5rem",
        IconSize::Xl => "6rem",
    }
}

fn image_radius(style: ImageStyle) -> &'static str {
    match style {
        ImageStyle::Circle => "50%",
        ImageStyle::Square | ImageStyle::None => "0",
        ImageStyle::Rounded => "var(--menu-border-radius)",
    }
}

/// 卡片网格
pub struct GridLayout;

impl MenuLayout for GridLayout {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn render(&self, items: &[&pos_menu_items::Model], ctx: &LayoutContext<'_>, out: &mut String) {
        let columns = match ctx.presentation.density {
            Density::Compact => 4,
            _ => 3,
        };
        out.push_str(&format!(
            r#"<div class="menu-grid" style="display:grid;grid-template-columns:repeat({columns},minmax(0,1fr));gap:1rem">"#
        ));
        for item in items {
            out.push_str(r#"<div class="menu-card">"#);
            if ctx.detailed() {
                out.push_str(&ctx.image(item));
            }
            out.push_str(&format!(
                r#"<div class="menu-card-body"><h3 class="menu-item-name">{}</h3><div class="menu-item-price">{}{}</div></div>"#,
                escape_html(&item.name),
                format_price(item.price),
                ctx.badge(),
            ));
            out.push_str("</div>");
        }
        out.push_str("</div>");
    }
}

/// 单列列表
pub struct ListLayout;

impl MenuLayout for ListLayout {
    fn name(&self) -> &'static str {
        "list"
    }

    fn render(&self, items: &[&pos_menu_items::Model], ctx: &LayoutContext<'_>, out: &mut String) {
        out.push_str(r#"<ul class="menu-list">"#);
        for item in items {
            out.push_str(r#"<li class="menu-row"><div class="menu-row-main">"#);
            out.push_str(&ctx.image(item));
            out.push_str(&format!(
                r#"<div><span class="menu-item-name">{}</span>"#,
                escape_html(&item.name)
            ));
            if ctx.detailed() {
                out.push_str(&format!(
                    r#"<span class="menu-item-category">{}</span>"#,
                    escape_html(&item.category)
                ));
            }
            out.push_str(&format!(
                r#"</div></div><div class="menu-row-side">{}<span class="menu-item-price">{}</span></div></li>"#,
                ctx.badge(),
                format_price(item.price),
            ));
        }
        out.push_str("</ul>");
    }
}

/// 表格
pub struct TableLayout;

impl MenuLayout for TableLayout {
    fn name(&self) -> &'static str {
        "table"
    }

    fn render(&self, items: &[&pos_menu_items::Model], ctx: &LayoutContext<'_>, out: &mut String) {
        out.push_str(r#"<table class="menu-table"><thead><tr>"#);
        if ctx.shows_images() {
            out.push_str("<th></th>");
        }
        if ctx.detailed() {
            out.push_str("<th>Category</th>");
        }
        out.push_str("<th>Item</th><th>Price</th><th></th></tr></thead><tbody>");

        for item in items {
            out.push_str("<tr>");
            if ctx.shows_images() {
                out.push_str(&format!("<td>{}</td>", ctx.image(item)));
            }
            if ctx.detailed() {
                out.push_str(&format!("<td>{}</td>", escape_html(&item.category)));
            }
            out.push_str(&format!(
                r#"<td class="menu-item-name">{}</td><td class="menu-item-price">{}</td><td>{}</td></tr>"#,
                escape_html(&item.name),
                format_price(item.price),
                ctx.badge(),
            ));
        }
        out.push_str("</tbody></table>");
    }
}

/// 瀑布流多列
pub struct MasonryLayout;

impl MenuLayout for MasonryLayout {
    fn name(&self) -> &'static str {
        "masonry"
    }

    fn render(&self, items: &[&pos_menu_items::Model], ctx: &LayoutContext<'_>, out: &mut String) {
        let columns = match ctx.presentation.density {
            Density::Spacious => 3,
            _ => 4,
        };
        out.push_str(&format!(
            r#"<div class="menu-masonry" style="column-count:{columns};column-gap:1rem">"#
        ));
        for item in items {
            out.push_str(r#"<div class="menu-card" style="break-inside:avoid;margin-bottom:1rem">"#);
            out.push_str(&ctx.image(item));
            out.push_str(&format!(
                r#"<h3 class="menu-item-name">{}</h3>"#,
                escape_html(&item.name)
            ));
            if ctx.detailed() {
                out.push_str(&format!(
                    r#"<p class="menu-item-category">{}</p>"#,
                    escape_html(&item.category)
                ));
            }
            out.push_str(&format!(
                r#"<div class="menu-item-price">{}{}</div></div>"#,
                format_price(item.price),
                ctx.badge(),
            ));
        }
        out.push_str("</div>");
    }
}

static GRID: GridLayout = GridLayout;
static LIST: ListLayout = ListLayout;
static TABLE: TableLayout = TableLayout;
static MASONRY: MasonryLayout = MasonryLayout;

/// 按主题的 layout 属性选择排版策略
pub fn layout_for(layout: Layout) -> &'static dyn MenuLayout {
    match layout {
        Layout::Grid => &GRID,
        Layout::List => &LIST,
        Layout::Table => &TABLE,
        Layout::Masonry => &MASONRY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::themes::resolve_theme;

    fn item(name: &str, image: Option<&str>) -> pos_menu_items::Model {
        pos_menu_items::Model {
            id: "i1".to_string(),
            pos_account_id: "a1".to_string(),
            name: name.to_string(),
            price: 120.0,
            category: "Mains".to_string(),
            image: image.map(str::to_string),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn dispatch_follows_theme_layout() {
        assert_eq!(layout_for(resolve_theme("modern").presentation.layout).name(), "grid");
        assert_eq!(layout_for(resolve_theme("elegant").presentation.layout).name(), "list");
        assert_eq!(layout_for(resolve_theme("vintage").presentation.layout).name(), "table");
        assert_eq!(layout_for(resolve_theme("colorful").presentation.layout).name(), "masonry");
    }

    #[test]
    fn table_without_images_has_no_image_column() {
        let theme = resolve_theme("professional");
        let ctx = LayoutContext {
            presentation: &theme.presentation,
            gst_badge: true,
        };
        let burger = item("Classic Burger", Some("https://img.example/b.png"));
        let mut out = String::new();
        TableLayout.render(&[&burger], &ctx, &mut out);

        assert!(!out.contains("<img"));
        assert!(out.contains("<th>Category</th>"));
        assert!(out.contains("Incl. GST"));
        assert!(out.contains("₹120"));
    }

    #[test]
    fn item_text_is_escaped() {
        let theme = resolve_theme("fun");
        let ctx = LayoutContext {
            presentation: &theme.presentation,
            gst_badge: false,
        };
        let evil = item("<script>alert(1)</script>", None);
        let mut out = String::new();
        MasonryLayout.render(&[&evil], &ctx, &mut out);

        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;"));
        assert!(!out.contains("Incl. GST"));
    }
}
