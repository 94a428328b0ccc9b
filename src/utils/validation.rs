//! 表单与参数校验
//!
//! 所有校验失败都返回 `AppError::Validation`，消息直接展示给客户端。

use crate::error::{AppError, AppResult};

pub const MOBILE_NUMBER_LENGTH: usize = 10;
pub const PIN_LENGTH: usize = 8;
pub const MAX_LICENSE_DAYS: i64 = 36_500;
const MAX_COLOR_LENGTH: usize = 64;

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

pub fn validate_mobile_number(mobile: &str) -> AppResult<()> {
    if !is_digits(mobile, MOBILE_NUMBER_LENGTH) {
        return Err(AppError::validation(
            "Mobile number must be exactly 10 digits",
        ));
    }
    Ok(())
}

pub fn validate_pin(pin: &str) -> AppResult<()> {
    if !is_digits(pin, PIN_LENGTH) {
        return Err(AppError::validation("PIN must be exactly 8 digits"));
    }
    Ok(())
}

/// 必填文本，返回去除首尾空白后的值
pub fn require_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// 可选文本：空白视为未填写
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate_price(price: f64) -> AppResult<f64> {
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::validation("Price must be greater than 0"));
    }
    Ok(round_money(price))
}

pub fn validate_tax_rate(rate: f64) -> AppResult<f64> {
    if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
        return Err(AppError::validation("Tax rate must be between 0 and 100"));
    }
    Ok(rate)
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if !email.contains('@') {
        return Err(AppError::validation("Invalid email address"));
    }
    Ok(())
}

pub fn validate_positive_days(field: &str, days: i64) -> AppResult<i64> {
    if days < 1 {
        return Err(AppError::validation(format!("{} must be at least 1", field)));
    }
    Ok(days)
}

/// 授权天数：1 到 `MAX_LICENSE_DAYS`
pub fn validate_license_days(field: &str, days: i64) -> AppResult<i64> {
    let days = validate_positive_days(field, days)?;
    if days > MAX_LICENSE_DAYS {
        return Err(AppError::validation(format!(
            "{} must be at most {} days",
            field, MAX_LICENSE_DAYS
        )));
    }
    Ok(days)
}

/// 颜色值只允许出现在 CSS 颜色函数中的字符，防止注入样式表
pub fn validate_css_color(key: &str, value: &str) -> AppResult<()> {
    let ok = !value.trim().is_empty()
        && value.len() <= MAX_COLOR_LENGTH
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || " #(),.%-".contains(c));
    if !ok {
        return Err(AppError::validation(format!(
            "Invalid color value for {}",
            key
        )));
    }
    Ok(())
}

/// 金额四舍五入到两位小数
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
