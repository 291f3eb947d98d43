//! Sales report
//!
//! Read-only projection over delivered orders. Rendering (PDF, spreadsheet)
//! happens outside the server.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::order::{Order, OrderStatus};
use thiserror::Error;

use crate::orders::money::{to_decimal, to_f64};

#[derive(Debug, Error, PartialEq)]
pub enum ReportError {
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("A custom report needs both start_date and end_date")]
    MissingCustomRange,

    #[error("Report range ends ({end}) before it starts ({start})")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Report period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesRange {
    /// Today
    Daily,
    /// The last seven days and today
    Weekly,
    /// The current calendar month
    Monthly,
    /// Both dates inclusive
    Custom { start: NaiveDate, end: NaiveDate },
}

impl SalesRange {
    /// Parse a `report_type` with its optional `YYYY-MM-DD` bounds
    pub fn parse(
        report_type: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self, ReportError> {
        match report_type {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "custom" => {
                let (Some(start), Some(end)) = (start_date, end_date) else {
                    return Err(ReportError::MissingCustomRange);
                };
                let start = parse_date(start)?;
                let end = parse_date(end)?;
                if end < start {
                    return Err(ReportError::InvertedRange { start, end });
                }
                Ok(Self::Custom { start, end })
            }
            other => Err(ReportError::InvalidDate(format!(
                "unknown report type {}",
                other
            ))),
        }
    }

    /// `[start, end)` in Unix millis (UTC days)
    pub fn bounds(&self, now: DateTime<Utc>) -> (i64, i64) {
        let today = now.date_naive();
        let (first, last) = match *self {
            Self::Daily => (today, today),
            Self::Weekly => (today - Duration::days(7), today),
            Self::Monthly => {
                let first = today.with_day(1).unwrap_or(today);
                let next_month = if first.month() == 12 {
                    NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
                };
                let last = next_month
                    .and_then(|d| d.pred_opt())
                    .unwrap_or(today);
                (first, last)
            }
            Self::Custom { start, end } => (start, end),
        };
        (day_start_millis(first), day_start_millis(last + Duration::days(1)))
    }
}

fn parse_date(date: &str) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| ReportError::InvalidDate(date.to_string()))
}

fn day_start_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReportLine {
    pub name: String,
    pub quantity: u32,
    pub regular_price: f64,
    pub final_price: f64,
}

/// One delivered order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReportEntry {
    pub order_id: String,
    pub date: i64,
    /// Paid for goods: `final_amount - delivery_charge`
    pub amount: f64,
    pub discount: f64,
    /// Coupon discount, zero when no coupon was applied
    pub coupon: f64,
    /// Regular value of the goods minus `amount`
    pub less_price: f64,
    pub items: Vec<SalesReportLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: f64,
    pub order_count: usize,
    pub total_discounts: f64,
    pub total_coupons: f64,
    pub total_less_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    pub start: i64,
    pub end: i64,
    pub sales: Vec<SalesReportEntry>,
    pub summary: SalesSummary,
}

/// Build the report for orders created in `[start, end)`, oldest first
pub fn sales_report(orders: &[Order], (start, end): (i64, i64)) -> SalesReport {
    let mut delivered: Vec<&Order> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Delivered)
        .filter(|o| o.created_on >= start && o.created_on < end)
        .collect();
    delivered.sort_by_key(|o| o.created_on);

    let mut total_sales = Decimal::ZERO;
    let mut total_discounts = Decimal::ZERO;
    let mut total_coupons = Decimal::ZERO;
    let mut total_less = Decimal::ZERO;

    let sales: Vec<SalesReportEntry> = delivered
        .into_iter()
        .map(|order| {
            let regular: Decimal = order
                .items
                .iter()
                .map(|i| to_decimal(i.regular_price) * Decimal::from(i.quantity))
                .sum();
            let amount = to_decimal(order.final_amount) - to_decimal(order.delivery_charge);
            let discount = to_decimal(order.discount);
            let coupon = if order.coupon_applied {
                discount
            } else {
                Decimal::ZERO
            };
            let less = regular - amount;

            total_sales += amount;
            total_discounts += discount;
            total_coupons += coupon;
            total_less += less;

            SalesReportEntry {
                order_id: order.order_id.clone(),
                date: order.created_on,
                amount: to_f64(amount),
                discount: to_f64(discount),
                coupon: to_f64(coupon),
                less_price: to_f64(less),
                items: order
                    .items
                    .iter()
                    .map(|i| SalesReportLine {
                        name: i.product_name.clone(),
                        quantity: i.quantity,
                        regular_price: i.regular_price,
                        final_price: i.price,
                    })
                    .collect(),
            }
        })
        .collect();

    let summary = SalesSummary {
        total_sales: to_f64(total_sales),
        order_count: sales.len(),
        total_discounts: to_f64(total_discounts),
        total_coupons: to_f64(total_coupons),
        total_less_price: to_f64(total_less),
    };

    SalesReport {
        start,
        end,
        sales,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::fixtures::{item, order as order_of};
    use chrono::TimeZone;
    use shared::order::PaymentMethod;

    const DAY: i64 = 86_400_000;

    fn line(regular: f64, price: f64, quantity: u32) -> shared::order::OrderedItem {
        let mut line = item("i", "lamp", price, quantity, OrderStatus::Delivered);
        line.regular_price = regular;
        line
    }

    fn order(
        order_id: &str,
        created_on: i64,
        status: OrderStatus,
        items: Vec<shared::order::OrderedItem>,
    ) -> Order {
        let mut order = order_of(order_id, "u-1", PaymentMethod::Cod, items);
        order.status = status;
        order.created_on = created_on;
        order
    }

    #[test]
    fn test_report_over_delivered_orders_in_range() {
        let mut with_coupon = order("o-1", 10 * DAY, OrderStatus::Delivered, vec![line(1000.0, 800.0, 1)]);
        with_coupon.discount = 50.0;
        with_coupon.coupon_applied = true;
        with_coupon.final_amount = 750.0;

        let mut shipped_small = order("o-2", 11 * DAY, OrderStatus::Delivered, vec![line(400.0, 400.0, 1)]);
        shipped_small.delivery_charge = 40.0;
        shipped_small.final_amount = 440.0;

        let orders = vec![
            shipped_small,
            with_coupon,
            order("o-3", 10 * DAY, OrderStatus::Shipped, vec![line(100.0, 100.0, 1)]),
            order("o-4", 20 * DAY, OrderStatus::Delivered, vec![line(100.0, 100.0, 1)]),
        ];

        let report = sales_report(&orders, (10 * DAY, 12 * DAY));

        assert_eq!(report.sales.len(), 2);
        assert_eq!(report.sales[0].order_id, "o-1");
        assert_eq!(report.sales[0].amount, 750.0);
        assert_eq!(report.sales[0].coupon, 50.0);
        assert_eq!(report.sales[0].less_price, 250.0);
        assert_eq!(report.sales[1].amount, 400.0);
        assert_eq!(report.sales[1].less_price, 0.0);

        assert_eq!(report.summary.order_count, 2);
        assert_eq!(report.summary.total_sales, 1150.0);
        assert_eq!(report.summary.total_discounts, 50.0);
        assert_eq!(report.summary.total_coupons, 50.0);
        assert_eq!(report.summary.total_less_price, 250.0);
    }

    #[test]
    fn test_empty_report() {
        let report = sales_report(&[], (0, DAY));
        assert!(report.sales.is_empty());
        assert_eq!(report.summary, SalesSummary::default());
    }

    #[test]
    fn test_range_bounds() {
        let now = Utc.with_ymd_and_hms(2024, 12, 18, 15, 30, 0).unwrap();
        let day = |y, m, d| day_start_millis(NaiveDate::from_ymd_opt(y, m, d).unwrap());

        assert_eq!(SalesRange::Daily.bounds(now), (day(2024, 12, 18), day(2024, 12, 19)));
        assert_eq!(SalesRange::Weekly.bounds(now), (day(2024, 12, 11), day(2024, 12, 19)));
        assert_eq!(SalesRange::Monthly.bounds(now), (day(2024, 12, 1), day(2025, 1, 1)));

        let custom = SalesRange::parse("custom", Some("2024-06-01"), Some("2024-06-10")).unwrap();
        assert_eq!(custom.bounds(now), (day(2024, 6, 1), day(2024, 6, 11)));
    }

    #[test]
    fn test_parse_rejects_bad_ranges() {
        assert_eq!(
            SalesRange::parse("custom", Some("2024-06-01"), None),
            Err(ReportError::MissingCustomRange)
        );
        assert!(matches!(
            SalesRange::parse("custom", Some("06/01/2024"), Some("2024-06-10")),
            Err(ReportError::InvalidDate(_))
        ));
        assert!(matches!(
            SalesRange::parse("custom", Some("2024-06-10"), Some("2024-06-01")),
            Err(ReportError::InvertedRange { .. })
        ));
        assert_eq!(SalesRange::parse("weekly", None, None), Ok(SalesRange::Weekly));
    }
}
