//! 公开菜单 HTML 页面

use super::layouts::{LayoutContext, layout_for};
use super::{MenuFilter, PublicMenu, group_by_category};

/// 转义 HTML 特殊字符
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// 价格显示为整数卢比
pub fn format_price(price: f64) -> String {
    format!("₹{:.0}", price)
}

/// 税率显示：整数不带小数位
fn format_rate(rate: f64) -> String {
    if rate.fract() == 0.0 {
        format!("{:.0}", rate)
    } else {
        format!("{}", rate)
    }
}

fn url_encode(text: &str) -> String {
    url::form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

const BASE_STYLE: &str = "\
body{margin:0;background:var(--menu-background);color:var(--menu-text);font-family:var(--menu-font-body)}\
h1,h2,h3{font-family:var(--menu-font-heading);margin:0}\
.menu-header{background:var(--menu-primary);color:#fff;padding:var(--menu-section-padding);text-align:center}\
.menu-header p{margin:.25rem 0;opacity:.9}\
.menu-main{max-width:64rem;margin:0 auto;padding:var(--menu-section-padding)}\
.menu-search input{width:100%;padding:.75rem;border:1px solid var(--menu-border);border-radius:var(--menu-border-radius)}\
.menu-chips{display:flex;flex-wrap:wrap;gap:.5rem;margin:1rem 0}\
.menu-chip{padding:.375rem .875rem;border-radius:999px;border:1px solid var(--menu-border);color:var(--menu-text);text-decoration:none;background:var(--menu-surface)}\
.menu-chip.active{background:var(--menu-primary);color:#fff;box-shadow:var(--menu-shadow-button)}\
.menu-section{margin-bottom:var(--menu-section-padding)}\
.menu-section h2{color:var(--menu-primary);margin-bottom:1rem}\
.menu-card{background:var(--menu-surface);border:1px solid var(--menu-border);border-radius:var(--menu-border-radius);box-shadow:var(--menu-shadow-card);padding:var(--menu-card-padding)}\
.menu-list{list-style:none;padding:0;margin:0}\
.menu-row{display:flex;justify-content:space-between;align-items:center;padding:.75rem 0;border-bottom:1px solid var(--menu-border)}\
.menu-row-main{display:flex;align-items:center;gap:.75rem}\
.menu-table{width:100%;border-collapse:collapse}\
.menu-table td,.menu-table th{padding:.5rem;border-bottom:1px solid var(--menu-border);text-align:left}\
.menu-item-price{color:var(--menu-primary);font-weight:600}\
.menu-item-category{display:block;color:var(--menu-text-secondary);font-size:.875rem}\
.menu-badge{margin-left:.5rem;font-size:.75rem;color:var(--menu-accent)}\
.menu-empty{text-align:center;color:var(--menu-text-secondary);padding:2rem}\
.menu-footer{text-align:center;color:var(--menu-text-secondary);font-size:.875rem;padding:var(--menu-section-padding)}";

fn page_head(out: &mut String, title: &str, vars: &[(String, String)]) {
    out.push_str(&format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{}</title><style>:root{{"#,
        escape_html(title)
    ));
    for (name, value) in vars {
        out.push_str(&format!("{}:{};", name, value));
    }
    out.push('}');
    out.push_str(BASE_STYLE);
    out.push_str("</style></head><body>");
}

/// 渲染公开菜单页面
pub fn render_menu_page(menu: &PublicMenu, filter: &MenuFilter) -> String {
    let settings = &menu.settings;
    let mut out = String::with_capacity(16 * 1024);

    page_head(&mut out, &settings.restaurant_name, &menu.theme.css_variables());

    // 页头
    out.push_str(&format!(
        r#"<header class="menu-header"><h1>{}</h1>"#,
        escape_html(&settings.restaurant_name)
    ));
    for line in [&settings.address, &settings.phone, &settings.email]
        .into_iter()
        .flatten()
    {
        out.push_str(&format!("<p>{}</p>", escape_html(line)));
    }
    out.push_str("</header><main class=\"menu-main\">");

    // 搜索
    let query = filter.q.as_deref().unwrap_or_default();
    out.push_str(r#"<form class="menu-search" method="get">"#);
    if let Some(category) = filter.selected_category() {
        out.push_str(&format!(
            r#"<input type="hidden" name="category" value="{}">"#,
            escape_html(category)
        ));
    }
    out.push_str(&format!(
        r#"<input type="search" name="q" value="{}" placeholder="Search menu items..."></form>"#,
        escape_html(query)
    ));

    // 分类
    let selected = filter.selected_category();
    let query_param = if query.is_empty() {
        String::new()
    } else {
        format!("q={}&amp;", url_encode(query))
    };
    out.push_str(r#"<nav class="menu-chips">"#);
    out.push_str(&format!(
        r#"<a class="menu-chip{}" href="?{}category=All">All</a>"#,
        if selected.is_none() { " active" } else { "" },
        query_param,
    ));
    for category in menu.categories() {
        out.push_str(&format!(
            r#"<a class="menu-chip{}" href="?{}category={}">{}</a>"#,
            if selected == Some(category) { " active" } else { "" },
            query_param,
            url_encode(category),
            escape_html(category),
        ));
    }
    out.push_str("</nav>");

    // 菜品
    let visible = filter.apply(&menu.menu_items);
    if visible.is_empty() {
        out.push_str(r#"<p class="menu-empty">No items found matching your search.</p>"#);
    } else {
        let presentation = &menu.theme.definition.presentation;
        let ctx = LayoutContext {
            presentation,
            gst_badge: settings.shows_gst_badge(),
        };
        let layout = layout_for(presentation.layout);
        for (category, items) in group_by_category(&visible) {
            out.push_str(&format!(
                r#"<section class="menu-section"><h2>{}</h2>"#,
                escape_html(category)
            ));
            layout.render(&items, &ctx, &mut out);
            out.push_str("</section>");
        }
    }
    out.push_str("</main>");

    // 页脚
    out.push_str(r#"<footer class="menu-footer">"#);
    if let Some(fssai) = settings.fssai_number.as_deref().filter(|s| !s.is_empty()) {
        out.push_str(&format!("<p>FSSAI License: {}</p>", escape_html(fssai)));
    }
    out.push_str("<p>Prices are subject to change without notice</p>");
    if !settings.gst_inclusive && settings.tax_rate > 0.0 {
        out.push_str(&format!(
            "<p>* Prices are exclusive of {}% GST</p>",
            format_rate(settings.tax_rate)
        ));
    }
    out.push_str("</footer></body></html>");

    out
}

/// 标识不存在或菜单已停用
pub fn render_not_found_page() -> String {
    let vars = super::AppliedTheme::from_row(None).css_variables();
    let mut out = String::new();
    page_head(&mut out, "Menu Not Found", &vars);
    out.push_str(
        r#"<main class="menu-main"><div class="menu-empty"><h1>Menu Not Found</h1><p>The menu you're looking for doesn't exist or is no longer available.</p></div></main></body></html>"#,
    );
    out
}
