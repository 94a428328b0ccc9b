//! PDF 生成：58mm 热敏小票、销售报表、打印菜单
//!
//! 内置字体不含卢比符号，金额统一写作 `Rs.`。

use chrono::{DateTime, FixedOffset};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
    Point,
};

use crate::billing::TaxBreakdown;
use crate::database::repository::orders_repository::OrderWithItems;
use crate::entity::{pos_menu_items, pos_settings};
use crate::error::AppResult;
use crate::menu::group_by_category;

use super::{ReportDocument, format_money};

const PT_TO_MM: f64 = 0.3528;

const RECEIPT_WIDTH: f64 = 58.0;
const RECEIPT_HEIGHT: f64 = 200.0;
const RECEIPT_MARGIN: f64 = 3.0;

const A4_WIDTH: f64 = 210.0;
const A4_HEIGHT: f64 = 297.0;
const A4_MARGIN: f64 = 20.0;

/// 按页面从上往下排版的简单画布
struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// 字符平均宽度（em）
    glyph_em: f64,
    width: f64,
    height: f64,
    margin: f64,
    /// 距页面顶部的距离（mm）
    y: f64,
    pages: usize,
}

impl Canvas {
    fn new(
        title: &str,
        width: f64,
        height: f64,
        margin: f64,
        fonts: (BuiltinFont, BuiltinFont),
        glyph_em: f64,
    ) -> AppResult<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(width as f32), Mm(height as f32), "Layer 1");
        let regular = doc.add_builtin_font(fonts.0)?;
        let bold = doc.add_builtin_font(fonts.1)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            glyph_em,
            width,
            height,
            margin,
            y: margin,
            pages: 1,
        })
    }

    fn text_width(&self, text: &str, size: f64) -> f64 {
        text.chars().count() as f64 * size * self.glyph_em * PT_TO_MM
    }

    /// 一行能容纳的字符数
    fn chars_per_line(&self, size: f64, available: f64) -> usize {
        ((available / (size * self.glyph_em * PT_TO_MM)).floor() as usize).max(1)
    }

    fn draw(&self, text: &str, size: f64, x: f64, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size as f32, Mm(x as f32), Mm((self.height - self.y) as f32), font);
    }

    fn left(&self, text: &str, size: f64, x: f64) {
        self.draw(text, size, x, false);
    }

    fn center(&self, text: &str, size: f64, bold: bool) {
        let x = ((self.width - self.text_width(text, size)) / 2.0).max(self.margin);
        self.draw(text, size, x, bold);
    }

    fn right(&self, text: &str, size: f64, right_edge: f64) {
        let x = (right_edge - self.text_width(text, size)).max(self.margin);
        self.draw(text, size, x, false);
    }

    fn rule(&self) {
        let y = Mm((self.height - self.y) as f32);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(self.margin as f32), y), false),
                (Point::new(Mm((self.width - self.margin) as f32), y), false),
            ],
            is_closed: false,
        });
    }

    fn advance(&mut self, mm: f64) {
        self.y += mm;
    }

    /// 剩余空间不足时换页
    fn ensure(&mut self, needed: f64) {
        if self.y + needed > self.height - self.margin {
            self.new_page();
        }
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(self.width as f32),
            Mm(self.height as f32),
            format!("Page {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = self.margin;
    }

    fn finish(self) -> AppResult<Vec<u8>> {
        Ok(self.doc.save_to_bytes()?)
    }
}

/// 按单词折行，超长单词硬切
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..max_chars).collect());
        }
        let word: String = word.into_iter().collect();
        if word.is_empty() {
            continue;
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn local_time(timestamp: i64, offset: FixedOffset) -> String {
    DateTime::from_timestamp(timestamp, 0)
        .map(|dt| dt.with_timezone(&offset).format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_default()
}

/// 58mm 热敏小票
pub fn receipt_pdf(
    order: &OrderWithItems,
    settings: &pos_settings::Model,
    offset: FixedOffset,
) -> AppResult<Vec<u8>> {
    let mut c = Canvas::new(
        &format!("Receipt {}", order.order.order_number),
        RECEIPT_WIDTH,
        RECEIPT_HEIGHT,
        RECEIPT_MARGIN,
        (BuiltinFont::Courier, BuiltinFont::CourierBold),
        0.6,
    )?;
    let right_edge = RECEIPT_WIDTH - RECEIPT_MARGIN;
    let inner = RECEIPT_WIDTH - 2.0 * RECEIPT_MARGIN;

    // 页头
    c.advance(7.0);
    for line in wrap_text(&settings.restaurant_name, c.chars_per_line(12.0, inner)) {
        c.center(&line, 12.0, true);
        c.advance(4.5);
    }
    if let Some(address) = settings.address.as_deref().filter(|s| !s.is_empty()) {
        for line in wrap_text(address, c.chars_per_line(8.0, inner)) {
            c.center(&line, 8.0, false);
            c.advance(3.0);
        }
    }
    if let Some(phone) = settings.phone.as_deref().filter(|s| !s.is_empty()) {
        c.center(phone, 8.0, false);
        c.advance(3.0);
    }

    c.advance(2.0);
    c.rule();
    c.advance(4.0);

    // 订单信息
    c.left(&format!("Order #{}", order.order.order_number), 8.0, RECEIPT_MARGIN);
    c.advance(3.0);
    c.left(&local_time(order.order.created_at, offset), 8.0, RECEIPT_MARGIN);
    c.advance(3.0);
    c.left(
        &format!("Payment: {}", order.order.payment_method.to_uppercase()),
        8.0,
        RECEIPT_MARGIN,
    );
    c.advance(2.0);
    c.rule();
    c.advance(4.0);

    // 明细：名称折行，价格右对齐在第一行
    let name_chars = c.chars_per_line(8.0, inner - 15.0);
    for item in &order.items {
        let label = format!("{}x {}", item.quantity, item.item_name);
        let lines = wrap_text(&label, name_chars);
        c.ensure(3.0 * lines.len() as f64 + 1.0);
        for (i, line) in lines.iter().enumerate() {
            c.left(line, 8.0, RECEIPT_MARGIN);
            if i == 0 {
                c.right(&format_money(item.total_price), 8.0, right_edge);
            }
            c.advance(3.0);
        }
        c.advance(1.0);
    }

    c.ensure(30.0);
    c.advance(1.0);
    c.rule();
    c.advance(4.0);

    // 合计
    let tax = TaxBreakdown::from_inclusive_total(order.order.total_amount, settings.tax_rate);
    c.left("Subtotal:", 8.0, RECEIPT_MARGIN);
    c.right(&format_money(tax.subtotal), 8.0, right_edge);
    c.advance(3.0);
    if settings.tax_rate > 0.0 {
        c.left(&format!("Tax ({}%):", settings.tax_rate), 8.0, RECEIPT_MARGIN);
        c.right(&format_money(tax.tax), 8.0, right_edge);
        c.advance(3.0);
    }
    c.advance(1.0);
    c.draw("TOTAL:", 10.0, RECEIPT_MARGIN, true);
    c.right(&format_money(tax.total), 10.0, right_edge);
    c.advance(8.0);

    // 页脚
    c.center("Thank you for your visit!", 8.0, false);
    c.advance(3.0);
    c.center("Please visit again", 8.0, false);

    c.finish()
}

/// A4 销售报表
pub fn report_pdf(report: &ReportDocument) -> AppResult<Vec<u8>> {
    let mut c = Canvas::new(
        &report.title,
        A4_WIDTH,
        A4_HEIGHT,
        A4_MARGIN,
        (BuiltinFont::Helvetica, BuiltinFont::HelveticaBold),
        0.5,
    )?;

    c.center(&report.restaurant_name, 20.0, true);
    c.advance(10.0);
    c.center(&report.title, 14.0, false);
    c.advance(10.0);
    c.center(&report.period, 12.0, false);
    c.advance(20.0);

    c.left(&format!("Total Orders: {}", report.summary.total_orders), 11.0, A4_MARGIN);
    c.advance(10.0);
    c.left(
        &format!("Total Revenue: {}", format_money(report.summary.total_revenue)),
        11.0,
        A4_MARGIN,
    );
    c.advance(10.0);
    c.left(
        &format!(
            "Average Order Value: {}",
            format_money(report.summary.average_order_value)
        ),
        11.0,
        A4_MARGIN,
    );
    c.advance(20.0);

    if !report.payments.is_empty() {
        c.draw("Payment Method Breakdown:", 11.0, A4_MARGIN, true);
        c.advance(10.0);
        for stats in &report.payments {
            c.ensure(10.0);
            c.left(
                &format!(
                    "{}: {} ({} orders)",
                    stats.method.as_str().to_uppercase(),
                    format_money(stats.revenue),
                    stats.orders
                ),
                11.0,
                A4_MARGIN + 10.0,
            );
            c.advance(10.0);
        }
        c.advance(10.0);
    }

    if let Some(table) = &report.table {
        let inner = A4_WIDTH - 2.0 * A4_MARGIN;
        let total_weight: f64 = table.widths.iter().sum();
        let columns: Vec<(f64, f64)> = table
            .widths
            .iter()
            .scan(A4_MARGIN, |x, w| {
                let width = inner * w / total_weight.max(f64::EPSILON);
                let start = *x;
                *x += width;
                Some((start, width))
            })
            .collect();

        let header_row = |c: &mut Canvas| {
            for ((x, _), header) in columns.iter().zip(&table.headers) {
                c.draw(header, 9.0, *x, true);
            }
            c.advance(2.0);
            c.rule();
            c.advance(5.0);
        };

        c.ensure(20.0);
        header_row(&mut c);
        for row in &table.rows {
            if c.y + 6.0 > c.height - c.margin {
                c.new_page();
                header_row(&mut c);
            }
            for ((x, width), cell) in columns.iter().zip(row) {
                let max = c.chars_per_line(9.0, width - 2.0);
                let text: String = cell.chars().take(max).collect();
                c.left(&text, 9.0, *x);
            }
            c.advance(6.0);
        }
    }

    c.finish()
}

/// 打印用菜单，按分类分组
pub fn menu_pdf(
    settings: &pos_settings::Model,
    items: &[pos_menu_items::Model],
) -> AppResult<Vec<u8>> {
    let mut c = Canvas::new(
        &format!("{} Menu", settings.restaurant_name),
        A4_WIDTH,
        A4_HEIGHT,
        A4_MARGIN,
        (BuiltinFont::Helvetica, BuiltinFont::HelveticaBold),
        0.5,
    )?;
    let right_edge = A4_WIDTH - A4_MARGIN;

    c.center(&settings.restaurant_name, 20.0, true);
    c.advance(8.0);
    let contact: Vec<&str> = [&settings.address, &settings.phone]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    if !contact.is_empty() {
        c.center(&contact.join(" | "), 10.0, false);
        c.advance(6.0);
    }
    c.advance(6.0);

    let refs: Vec<&pos_menu_items::Model> = items.iter().collect();
    for (category, group) in group_by_category(&refs) {
        c.ensure(20.0);
        c.draw(category, 14.0, A4_MARGIN, true);
        c.advance(2.0);
        c.rule();
        c.advance(7.0);
        for item in group {
            c.ensure(7.0);
            c.left(&item.name, 11.0, A4_MARGIN);
            c.right(&format!("Rs. {:.0}", item.price), 11.0, right_edge);
            c.advance(7.0);
        }
        c.advance(5.0);
    }

    c.ensure(20.0);
    if let Some(fssai) = settings.fssai_number.as_deref().filter(|s| !s.is_empty()) {
        c.center(&format!("FSSAI License: {}", fssai), 9.0, false);
        c.advance(5.0);
    }
    if settings.gst_inclusive && settings.tax_rate > 0.0 {
        c.center("All prices are inclusive of GST", 9.0, false);
    } else if settings.tax_rate > 0.0 {
        c.center(
            &format!("* Prices are exclusive of {}% GST", settings.tax_rate),
            9.0,
            false,
        );
    }

    c.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(
            wrap_text("2x Paneer Butter Masala", 12),
            vec!["2x Paneer", "Butter", "Masala"]
        );
        assert_eq!(wrap_text("short", 12), vec!["short"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn wrap_hard_splits_long_words() {
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn local_time_uses_offset() {
        let ist = FixedOffset::east_opt(330 * 60).unwrap();
        // 2025-01-01 00:00:00 UTC
        assert_eq!(local_time(1_735_689_600, ist), "01/01/2025 05:30");
    }
}
