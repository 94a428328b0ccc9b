//! 销售报表聚合
//!
//! 纯函数，不访问数据库。订单按配置的固定时区偏移划分到本地日期，
//! 一周从周日开始，日期区间两端都包含在内。

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::billing::PaymentMethod;
use crate::utils::validation::round_money;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderLine {
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// 报表使用的订单视图
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub order_number: String,
    pub payment_method: PaymentMethod,
    pub total: f64,
    pub created_at: i64,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Stats {
    pub orders: u64,
    pub revenue: f64,
}

impl Stats {
    fn add(&mut self, amount: f64) {
        self.orders += 1;
        self.revenue = round_money(self.revenue + amount);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodStats {
    pub today: Stats,
    pub week: Stats,
    pub month: Stats,
    pub year: Stats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySales {
    pub date: NaiveDate,
    pub orders: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSales {
    pub month: u32,
    pub orders: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentStats {
    pub method: PaymentMethod,
    pub orders: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSales {
    pub item_name: String,
    pub quantity_sold: i64,
    pub revenue: f64,
    pub order_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
}

/// 本地日期换算
#[derive(Debug, Clone, Copy)]
pub struct ReportClock {
    offset: FixedOffset,
}

impl ReportClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// 时间戳对应的本地日期
    pub fn local_date(&self, timestamp: i64) -> NaiveDate {
        DateTime::from_timestamp(timestamp, 0)
            .unwrap_or_default()
            .with_timezone(&self.offset)
            .date_naive()
    }

    /// 本地日期零点的时间戳
    pub fn day_start(&self, date: NaiveDate) -> i64 {
        date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
            - i64::from(self.offset.local_minus_utc())
    }

    /// `[start 零点, end 次日零点)` 的时间戳区间，对应闭区间 [start, end]
    pub fn range_bounds(&self, start: NaiveDate, end: NaiveDate) -> (i64, i64) {
        (self.day_start(start), self.day_start(end) + 86_400)
    }

    pub fn period_stats(&self, orders: &[OrderRecord], now: i64) -> PeriodStats {
        let today = self.local_date(now);
        let week = week_bounds(today);
        let mut stats = PeriodStats::default();

        for order in orders {
            let date = self.local_date(order.created_at);
            if date == today {
                stats.today.add(order.total);
            }
            if week.is_some_and(|(from, to)| date >= from && date <= to) {
                stats.week.add(order.total);
            }
            if date.year() == today.year() {
                stats.year.add(order.total);
                if date.month() == today.month() {
                    stats.month.add(order.total);
                }
            }
        }
        stats
    }

    /// 最近 n 天（含今天）的每日销售，按日期升序，无订单的日期补零
    pub fn last_n_days(&self, orders: &[OrderRecord], today: NaiveDate, n: u32) -> Vec<DaySales> {
        let mut days: Vec<DaySales> = (0..u64::from(n))
            .rev()
            .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
            .map(|date| DaySales {
                date,
                orders: 0,
                revenue: 0.0,
            })
            .collect();

        for order in orders {
            let date = self.local_date(order.created_at);
            if let Some(day) = days.iter_mut().find(|d| d.date == date) {
                day.orders += 1;
                day.revenue = round_money(day.revenue + order.total);
            }
        }
        days
    }

    pub fn orders_on<'a>(&self, orders: &'a [OrderRecord], date: NaiveDate) -> Vec<&'a OrderRecord> {
        self.orders_between(orders, date, date)
    }

    /// 落在 [start, end] 内的订单（两端日期都包含）
    pub fn orders_between<'a>(
        &self,
        orders: &'a [OrderRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<&'a OrderRecord> {
        orders
            .iter()
            .filter(|order| {
                let date = self.local_date(order.created_at);
                date >= start && date <= end
            })
            .collect()
    }

    /// 有订单的日期汇总，按日期升序
    pub fn daily_totals<'a, I>(&self, orders: I) -> Vec<DaySales>
    where
        I: IntoIterator<Item = &'a OrderRecord>,
    {
        let mut by_day: HashMap<NaiveDate, Stats> = HashMap::new();
        for order in orders {
            by_day
                .entry(self.local_date(order.created_at))
                .or_default()
                .add(order.total);
        }

        let mut days: Vec<DaySales> = by_day
            .into_iter()
            .map(|(date, stats)| DaySales {
                date,
                orders: stats.orders,
                revenue: stats.revenue,
            })
            .collect();
        days.sort_by_key(|d| d.date);
        days
    }

    /// 指定月份中有订单的日期，按日期升序
    pub fn daily_breakdown(&self, orders: &[OrderRecord], year: i32, month: u32) -> Vec<DaySales> {
        self.daily_totals(orders.iter().filter(|order| {
            let date = self.local_date(order.created_at);
            date.year() == year && date.month() == month
        }))
    }

    /// 指定年份的 12 个月汇总
    pub fn monthly_breakdown(&self, orders: &[OrderRecord], year: i32) -> Vec<MonthSales> {
        let mut months: Vec<MonthSales> = (1..=12)
            .map(|month| MonthSales {
                month,
                orders: 0,
                revenue: 0.0,
            })
            .collect();

        for order in orders {
            let date = self.local_date(order.created_at);
            if date.year() == year {
                let slot = &mut months[date.month0() as usize];
                slot.orders += 1;
                slot.revenue = round_money(slot.revenue + order.total);
            }
        }
        months
    }
}

/// 日期所在周的周日；超出日期范围时返回 None
pub fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
}

/// 日期所在周的周日到周六
pub fn week_bounds(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let start = week_start(date)?;
    Some((start, start.checked_add_days(Days::new(6))?))
}

/// 截至 today（含）共 days 天的第一天，最早到 `NaiveDate::MIN`
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN)
}

/// 月份的第一天和最后一天
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// 按支付方式汇总，顺序为 cash / upi / card，省略没有订单的方式
pub fn payment_breakdown<'a, I>(orders: I) -> Vec<PaymentStats>
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    let mut by_method: HashMap<PaymentMethod, Stats> = HashMap::new();
    for order in orders {
        by_method.entry(order.payment_method).or_default().add(order.total);
    }

    PaymentMethod::ALL
        .iter()
        .filter_map(|method| {
            by_method.get(method).map(|stats| PaymentStats {
                method: *method,
                orders: stats.orders,
                revenue: stats.revenue,
            })
        })
        .collect()
}

/// 按菜名汇总销量与销售额，销售额降序
pub fn item_breakdown<'a, I>(orders: I) -> Vec<ItemSales>
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    let mut by_item: HashMap<&str, ItemSales> = HashMap::new();
    for order in orders {
        let mut seen_in_order: Vec<&str> = Vec::new();
        for line in &order.items {
            let entry = by_item
                .entry(line.item_name.as_str())
                .or_insert_with(|| ItemSales {
                    item_name: line.item_name.clone(),
                    quantity_sold: 0,
                    revenue: 0.0,
                    order_count: 0,
                });
            entry.quantity_sold += line.quantity;
            entry.revenue = round_money(entry.revenue + line.total_price);
            if !seen_in_order.contains(&line.item_name.as_str()) {
                entry.order_count += 1;
                seen_in_order.push(line.item_name.as_str());
            }
        }
    }

    let mut items: Vec<ItemSales> = by_item.into_values().collect();
    items.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    items
}

pub fn summary<'a, I>(orders: I) -> Summary
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    let mut stats = Stats::default();
    for order in orders {
        stats.add(order.total);
    }
    let average = if stats.orders == 0 {
        0.0
    } else {
        round_money(stats.revenue / stats.orders as f64)
    };
    Summary {
        total_orders: stats.orders,
        total_revenue: stats.revenue,
        average_order_value: average,
    }
}
