//! 公开菜单二维码

use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};

use crate::error::AppResult;

const QR_MIN_SIZE: u32 = 300;
const QR_DARK: &str = "#1f2937";
const QR_LIGHT: &str = "#ffffff";

/// 公开菜单地址 `{base}/menu/{slug}`
pub fn public_menu_url(base_url: &str, slug: &str) -> String {
    format!("{}/menu/{}", base_url.trim_end_matches('/'), slug)
}

/// 把地址渲染为 SVG 二维码（纠错等级 M）
pub fn menu_qr_svg(url: &str) -> AppResult<String> {
    let code = QrCode::with_error_correction_level(url.as_bytes(), EcLevel::M)?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(QR_MIN_SIZE, QR_MIN_SIZE)
        .dark_color(svg::Color(QR_DARK))
        .light_color(svg::Color(QR_LIGHT))
        .quiet_zone(true)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        assert_eq!(
            public_menu_url("https://menu.example.com/", "spice-garden"),
            "https://menu.example.com/menu/spice-garden"
        );
        assert_eq!(
            public_menu_url("http://localhost:8080", "menu"),
            "http://localhost:8080/menu/menu"
        );
    }

    #[test]
    fn svg_uses_configured_colors() {
        let svg = menu_qr_svg("http://localhost:8080/menu/spice-garden").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains(QR_DARK));
        assert!(svg.contains(QR_LIGHT));
    }
}
