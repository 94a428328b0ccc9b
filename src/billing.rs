//! 收银台购物车与税额计算

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::database::dto::OrderItemInput;
use crate::utils::validation::round_money;

/// 支付方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PaymentMethod {
    Cash,
    Upi,
    Card,
}

impl PaymentMethod {
    /// 报表中的固定顺序
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Cash, PaymentMethod::Upi, PaymentMethod::Card];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "upi" => Ok(PaymentMethod::Upi),
            "card" => Ok(PaymentMethod::Card),
            other => Err(format!("Unknown payment method: {}", other)),
        }
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 购物车中的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartLine {
    pub fn line_total(&self) -> f64 {
        round_money(self.unit_price * f64::from(self.quantity))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一份菜品，已存在时数量加一
    pub fn add(&mut self, item_id: &str, name: &str, unit_price: f64) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item_id == item_id) {
            line.quantity += 1;
            return;
        }
        self.lines.push(CartLine {
            item_id: item_id.to_string(),
            name: name.to_string(),
            unit_price,
            quantity: 1,
        });
    }

    /// 减少一份，数量归零时移除该行。返回该菜品是否在购物车中
    pub fn remove_one(&mut self, item_id: &str) -> bool {
        let Some(pos) = self.lines.iter().position(|l| l.item_id == item_id) else {
            return false;
        };
        if self.lines[pos].quantity > 1 {
            self.lines[pos].quantity -= 1;
        } else {
            self.lines.remove(pos);
        }
        true
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total(&self) -> f64 {
        round_money(self.lines.iter().map(CartLine::line_total).sum())
    }

    /// 转换为下单参数
    pub fn to_order_items(&self) -> Vec<OrderItemInput> {
        self.lines
            .iter()
            .map(|line| OrderItemInput {
                item_name: line.name.clone(),
                quantity: line.quantity as i32,
                unit_price: line.unit_price,
            })
            .collect()
    }
}

/// 含税总额拆分出的税前金额与税额
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaxBreakdown {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub rate: f64,
}

impl TaxBreakdown {
    /// subtotal = total / (1 + rate/100)，tax = total - subtotal
    pub fn from_inclusive_total(total: f64, rate: f64) -> Self {
        let subtotal = total / (1.0 + rate / 100.0);
        Self {
            subtotal,
            tax: total - subtotal,
            total,
            rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_increments_existing_line() {
        let mut cart = Cart::new();
        cart.add("1", "Classic Burger", 120.0);
        cart.add("2", "Coca Cola", 60.0);
        cart.add("1", "Classic Burger", 120.0);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), 300.0);
    }

    #[test]
    fn remove_one_decrements_then_drops() {
        let mut cart = Cart::new();
        cart.add("1", "Classic Burger", 120.0);
        cart.add("1", "Classic Burger", 120.0);

        assert!(cart.remove_one("1"));
        assert_eq!(cart.lines()[0].quantity, 1);
        assert!(cart.remove_one("1"));
        assert!(cart.is_empty());
        assert!(!cart.remove_one("1"));
    }

    #[test]
    fn clear_and_order_items() {
        let mut cart = Cart::new();
        cart.add("3", "Creamy Pasta", 180.0);
        cart.add("3", "Creamy Pasta", 180.0);

        let items = cart.to_order_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_name, "Creamy Pasta");
        assert_eq!(items[0].quantity, 2);

        cart.clear();
        assert_eq!(cart.total(), 0.0);
    }

    #[test]
    fn inclusive_tax_split() {
        let tax = TaxBreakdown::from_inclusive_total(105.0, 5.0);
        assert!((tax.subtotal - 100.0).abs() < 1e-9);
        assert!((tax.tax - 5.0).abs() < 1e-9);

        let zero = TaxBreakdown::from_inclusive_total(80.0, 0.0);
        assert_eq!(zero.subtotal, 80.0);
        assert_eq!(zero.tax, 0.0);
    }

    #[test]
    fn payment_method_parsing_is_case_insensitive() {
        assert_eq!("UPI".parse::<PaymentMethod>(), Ok(PaymentMethod::Upi));
        assert_eq!(" Cash ".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
        assert!("cheque".parse::<PaymentMethod>().is_err());

        let parsed: PaymentMethod = serde_json::from_str("\"Card\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Card);
        assert_eq!(serde_json::to_string(&PaymentMethod::Upi).unwrap(), "\"upi\"");
    }
}
