//! 导出：PDF 小票与报表、菜单二维码
//!
//! 报表内容由本模块按报表类型组装成 `ReportDocument`，再交给 `pdf` 排版。

pub mod pdf;
pub mod qr;

use chrono::{DateTime, Datelike, NaiveDate};

use crate::reports::{
    OrderRecord, PaymentStats, ReportClock, Summary, month_bounds, payment_breakdown,
    item_breakdown, summary,
};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// PDF 中的金额
pub fn format_money(amount: f64) -> String {
    format!("Rs. {:.2}", amount)
}

fn month_name(month: u32) -> &'static str {
    MONTH_NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("")
}

fn display_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}

/// 报表中的表格，`widths` 为各列的相对宽度
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub headers: Vec<String>,
    pub widths: Vec<f64>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    fn new(headers: &[&str], widths: &[f64]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            widths: widths.to_vec(),
            rows: Vec::new(),
        }
    }
}

/// 一份待排版的销售报表
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub restaurant_name: String,
    pub title: String,
    pub period: String,
    pub summary: Summary,
    pub payments: Vec<PaymentStats>,
    pub table: Option<ReportTable>,
}

/// 各类报表的组装
pub struct ReportBuilder<'a> {
    clock: ReportClock,
    restaurant_name: &'a str,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(clock: ReportClock, restaurant_name: &'a str) -> Self {
        Self {
            clock,
            restaurant_name,
        }
    }

    fn document(
        &self,
        title: &str,
        period: String,
        orders: &[&OrderRecord],
        table: Option<ReportTable>,
    ) -> ReportDocument {
        ReportDocument {
            restaurant_name: self.restaurant_name.to_string(),
            title: title.to_string(),
            period,
            summary: summary(orders.iter().copied()),
            payments: payment_breakdown(orders.iter().copied()),
            table,
        }
    }

    fn local_time(&self, timestamp: i64) -> String {
        DateTime::from_timestamp(timestamp, 0)
            .map(|dt| dt.with_timezone(&self.clock.offset()).format("%H:%M").to_string())
            .unwrap_or_default()
    }

    /// 日报：当天每一笔订单
    pub fn daily(&self, orders: &[OrderRecord], date: NaiveDate) -> ReportDocument {
        let day_orders = self.clock.orders_on(orders, date);

        let table = (!day_orders.is_empty()).then(|| {
            let mut table = ReportTable::new(
                &["Order ID", "Time", "Items", "Payment", "Total"],
                &[3.0, 1.5, 1.0, 1.5, 2.0],
            );
            table.rows = day_orders
                .iter()
                .map(|order| {
                    vec![
                        order.order_number.clone(),
                        self.local_time(order.created_at),
                        order.items.len().to_string(),
                        order.payment_method.as_str().to_uppercase(),
                        format_money(order.total),
                    ]
                })
                .collect();
            table
        });

        self.document("Daily Sales Report", display_date(date), &day_orders, table)
    }

    /// 周报：`week_bounds` 给出的周日到周六，逐日汇总
    pub fn weekly(&self, orders: &[OrderRecord], (start, end): (NaiveDate, NaiveDate)) -> ReportDocument {
        let week_orders = self.clock.orders_between(orders, start, end);

        let mut table = ReportTable::new(&["Date", "Orders", "Revenue"], &[2.0, 1.0, 2.0]);
        table.rows = self
            .clock
            .last_n_days(orders, end, 7)
            .into_iter()
            .map(|day| {
                vec![
                    display_date(day.date),
                    day.orders.to_string(),
                    format_money(day.revenue),
                ]
            })
            .collect();

        self.document(
            "Weekly Sales Report",
            format!("{} - {}", display_date(start), display_date(end)),
            &week_orders,
            Some(table),
        )
    }

    /// 月报：有订单的日期逐日汇总
    pub fn monthly(&self, orders: &[OrderRecord], year: i32, month: u32) -> ReportDocument {
        let month_orders = match month_bounds(year, month) {
            Some((first, last)) => self.clock.orders_between(orders, first, last),
            None => Vec::new(),
        };

        let days = self.clock.daily_breakdown(orders, year, month);
        let table = (!days.is_empty()).then(|| {
            let mut table = ReportTable::new(&["Date", "Orders", "Revenue"], &[2.0, 1.0, 2.0]);
            table.rows = days
                .iter()
                .map(|day| {
                    vec![
                        format!("{}/{}/{}", day.date.day(), month, year),
                        day.orders.to_string(),
                        format_money(day.revenue),
                    ]
                })
                .collect();
            table
        });

        self.document(
            "Monthly Sales Report",
            format!("{} {}", month_name(month), year),
            &month_orders,
            table,
        )
    }

    /// 年报：12 个月汇总
    pub fn yearly(&self, orders: &[OrderRecord], year: i32) -> ReportDocument {
        let year_orders: Vec<&OrderRecord> = orders
            .iter()
            .filter(|order| self.clock.local_date(order.created_at).year() == year)
            .collect();

        let mut table = ReportTable::new(&["Month", "Orders", "Revenue"], &[2.0, 1.0, 2.0]);
        table.rows = self
            .clock
            .monthly_breakdown(orders, year)
            .into_iter()
            .map(|m| {
                vec![
                    month_name(m.month).to_string(),
                    m.orders.to_string(),
                    format_money(m.revenue),
                ]
            })
            .collect();

        self.document(
            "Yearly Sales Report",
            year.to_string(),
            &year_orders,
            Some(table),
        )
    }

    /// 支付方式报表
    pub fn payment_methods(
        &self,
        orders: &[OrderRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ReportDocument {
        let range = self.clock.orders_between(orders, start, end);
        let breakdown = payment_breakdown(range.iter().copied());
        let total: f64 = breakdown.iter().map(|p| p.revenue).sum();

        let mut table = ReportTable::new(
            &["Payment Method", "Orders", "Revenue", "Share"],
            &[2.0, 1.0, 2.0, 1.0],
        );
        table.rows = breakdown
            .iter()
            .map(|p| {
                let share = if total > 0.0 {
                    p.revenue / total * 100.0
                } else {
                    0.0
                };
                vec![
                    p.method.as_str().to_uppercase(),
                    p.orders.to_string(),
                    format_money(p.revenue),
                    format!("{:.1}%", share),
                ]
            })
            .collect();

        self.document(
            "Payment Method Report",
            format!("{} - {}", display_date(start), display_date(end)),
            &range,
            Some(table),
        )
    }

    /// 菜品销售报表
    pub fn item_wise(
        &self,
        orders: &[OrderRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> ReportDocument {
        let range = self.clock.orders_between(orders, start, end);

        let mut table = ReportTable::new(
            &["Item", "Qty Sold", "Revenue", "Orders"],
            &[3.0, 1.0, 2.0, 1.0],
        );
        table.rows = item_breakdown(range.iter().copied())
            .into_iter()
            .map(|item| {
                vec![
                    item.item_name,
                    item.quantity_sold.to_string(),
                    format_money(item.revenue),
                    item.order_count.to_string(),
                ]
            })
            .collect();

        self.document(
            "Item-wise Sales Report",
            format!("{} - {}", display_date(start), display_date(end)),
            &range,
            Some(table),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::PaymentMethod;
    use crate::reports::OrderLine;
    use chrono::FixedOffset;

    fn clock() -> ReportClock {
        ReportClock::new(FixedOffset::east_opt(330 * 60).unwrap())
    }

    fn order(number: &str, method: PaymentMethod, total: f64, date: NaiveDate) -> OrderRecord {
        OrderRecord {
            order_number: number.to_string(),
            payment_method: method,
            total,
            created_at: clock().day_start(date) + 12 * 3600,
            items: vec![OrderLine {
                item_name: "Classic Burger".to_string(),
                quantity: 1,
                unit_price: total,
                total_price: total,
            }],
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn daily_report_lists_only_that_day() {
        let orders = vec![
            order("ORD-1", PaymentMethod::Cash, 120.0, d(2025, 3, 10)),
            order("ORD-2", PaymentMethod::Upi, 80.0, d(2025, 3, 10)),
            order("ORD-3", PaymentMethod::Card, 50.0, d(2025, 3, 11)),
        ];
        let report = ReportBuilder::new(clock(), "Spice Garden").daily(&orders, d(2025, 3, 10));

        assert_eq!(report.summary.total_orders, 2);
        assert_eq!(report.summary.total_revenue, 200.0);
        assert_eq!(report.table.as_ref().map(|t| t.rows.len()), Some(2));
        assert_eq!(report.payments.len(), 2);
        assert_eq!(report.period, "Mon Mar 10 2025");
    }

    #[test]
    fn empty_daily_report_has_no_table() {
        let report = ReportBuilder::new(clock(), "Spice Garden").daily(&[], d(2025, 3, 10));
        assert!(report.table.is_none());
        assert_eq!(report.summary.average_order_value, 0.0);
    }

    #[test]
    fn weekly_report_is_sunday_to_saturday() {
        let orders = vec![
            order("A", PaymentMethod::Cash, 10.0, d(2025, 3, 8)),
            order("B", PaymentMethod::Cash, 20.0, d(2025, 3, 9)),
            order("C", PaymentMethod::Cash, 30.0, d(2025, 3, 15)),
            order("D", PaymentMethod::Cash, 40.0, d(2025, 3, 16)),
        ];
        // 2025-03-12 is a Wednesday; week runs 03-09 .. 03-15
        let week = crate::reports::week_bounds(d(2025, 3, 12)).unwrap();
        let report = ReportBuilder::new(clock(), "X").weekly(&orders, week);

        assert_eq!(report.summary.total_orders, 2);
        assert_eq!(report.summary.total_revenue, 50.0);
        let table = report.table.unwrap();
        assert_eq!(table.rows.len(), 7);
        assert_eq!(table.rows[0][0], "Sun Mar 09 2025");
    }

    #[test]
    fn monthly_and_yearly_reports() {
        let orders = vec![
            order("A", PaymentMethod::Cash, 10.0, d(2025, 2, 1)),
            order("B", PaymentMethod::Upi, 20.0, d(2025, 2, 28)),
            order("C", PaymentMethod::Cash, 30.0, d(2025, 3, 1)),
        ];
        let builder = ReportBuilder::new(clock(), "X");

        let monthly = builder.monthly(&orders, 2025, 2);
        assert_eq!(monthly.period, "February 2025");
        assert_eq!(monthly.summary.total_orders, 2);
        assert_eq!(monthly.table.unwrap().rows[1][0], "28/2/2025");

        let yearly = builder.yearly(&orders, 2025);
        let table = yearly.table.unwrap();
        assert_eq!(table.rows.len(), 12);
        assert_eq!(table.rows[1][1], "2");
        assert_eq!(yearly.summary.total_revenue, 60.0);
    }

    #[test]
    fn payment_shares() {
        let orders = vec![
            order("A", PaymentMethod::Cash, 75.0, d(2025, 3, 1)),
            order("B", PaymentMethod::Card, 25.0, d(2025, 3, 2)),
        ];
        let report =
            ReportBuilder::new(clock(), "X").payment_methods(&orders, d(2025, 3, 1), d(2025, 3, 2));
        let table = report.table.unwrap();
        assert_eq!(table.rows[0], vec!["CASH", "1", "Rs. 75.00", "75.0%"]);
        assert_eq!(table.rows[1][0], "CARD");
    }

    #[test]
    fn item_wise_aggregates_names() {
        let orders = vec![
            order("A", PaymentMethod::Cash, 120.0, d(2025, 3, 1)),
            order("B", PaymentMethod::Cash, 120.0, d(2025, 3, 2)),
        ];
        let report =
            ReportBuilder::new(clock(), "X").item_wise(&orders, d(2025, 3, 1), d(2025, 3, 1));
        let table = report.table.unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][1], "1");
    }
}
