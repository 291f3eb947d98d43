//! Order Price Calculator
//!
//! Aggregates priced lines into the summary shown on the cart page, the
//! checkout page and stored on a placed order.

use rust_decimal::prelude::*;
use serde::Serialize;

use super::PricedLine;
use crate::orders::money::{to_decimal, to_f64};

/// Shipping policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingConfig {
    /// Orders whose discounted subtotal is strictly above this ship free
    pub free_shipping_threshold: f64,
    pub shipping_charge: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: 500.0,
            shipping_charge: 40.0,
        }
    }
}

/// Price summary of a set of lines
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSummary {
    /// Σ regular price × quantity
    pub total_mrp: f64,
    /// Product and category discounts
    pub total_discount: f64,
    /// `total_mrp - total_discount`
    pub subtotal: f64,
    pub shipping_charge: f64,
    /// `subtotal + shipping_charge`
    pub final_price: f64,
}

/// Shipping charge for a discounted subtotal
pub fn shipping_for(subtotal: f64, config: &PricingConfig) -> f64 {
    if to_decimal(subtotal) > to_decimal(config.free_shipping_threshold) {
        0.0
    } else {
        config.shipping_charge
    }
}

/// Summarize priced lines
///
/// The same calculation backs the cart view, the checkout view and order
/// placement. An empty set of lines costs nothing, shipping included.
pub fn summarize_cart(lines: &[PricedLine], config: &PricingConfig) -> PriceSummary {
    if lines.is_empty() {
        return PriceSummary::default();
    }

    let total_mrp: Decimal = lines.iter().map(|l| to_decimal(l.line_mrp)).sum();
    let subtotal: Decimal = lines.iter().map(|l| to_decimal(l.line_total)).sum();
    let shipping = to_decimal(shipping_for(to_f64(subtotal), config));

    PriceSummary {
        total_mrp: to_f64(total_mrp),
        total_discount: to_f64(total_mrp - subtotal),
        subtotal: to_f64(subtotal),
        shipping_charge: to_f64(shipping),
        final_price: to_f64(subtotal + shipping),
    }
}
