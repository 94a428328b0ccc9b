//! 公开菜单链接标识

const MAX_SLUG_LEN: usize = 50;
const FALLBACK_SLUG: &str = "menu";

/// 由餐厅名生成标识：小写字母数字保留，其它字符连续出现时折叠为一个 `-`，
/// 去掉首尾 `-`，最长 50 个字符，结果为空时使用 `menu`。
pub fn generate_menu_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug.truncate(MAX_SLUG_LEN);
    let slug = slug.trim_end_matches('-');

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// 冲突时追加序号，总长度仍不超过上限
pub fn with_suffix(base: &str, n: u32) -> String {
    let suffix = format!("-{}", n);
    let keep = MAX_SLUG_LEN.saturating_sub(suffix.len()).min(base.len());
    format!("{}{}", base[..keep].trim_end_matches('-'), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_from_restaurant_name() {
        assert_eq!(generate_menu_slug("Spice Garden"), "spice-garden");
        assert_eq!(generate_menu_slug("  Joe's  Café & Bar!! "), "joe-s-caf-bar");
        assert_eq!(generate_menu_slug("A--B"), "a-b");
    }

    #[test]
    fn empty_or_symbol_only_falls_back() {
        assert_eq!(generate_menu_slug(""), "menu");
        assert_eq!(generate_menu_slug("!!! ###"), "menu");
    }

    #[test]
    fn slug_is_capped_at_fifty_chars() {
        let long = "x".repeat(80);
        assert_eq!(generate_menu_slug(&long).len(), 50);

        let dashed = format!("{} tail", "a".repeat(49));
        assert_eq!(generate_menu_slug(&dashed), "a".repeat(49));
    }

    #[test]
    fn collision_suffix() {
        assert_eq!(with_suffix("spice-garden", 2), "spice-garden-2");
        let long = "y".repeat(50);
        let suffixed = with_suffix(&long, 12);
        assert_eq!(suffixed.len(), 50);
        assert!(suffixed.ends_with("-12"));
    }
}
