//! Item Price Calculator
//!
//! Per-line pricing: the effective discount is the larger of the product's own
//! discount and its category offer, never their sum.
//!
//! Uses rust_decimal for precision calculations.

use rust_decimal::prelude::*;
use serde::Serialize;
use shared::models::{Category, Product};

use crate::orders::money::{percent_of, round2, to_decimal, to_f64};

/// Result of pricing one product line
#[derive(Debug, Clone, Serialize)]
pub struct PricedLine {
    pub product_id: String,
    pub product_name: String,
    pub images: Vec<String>,
    pub quantity: u32,
    /// Regular unit price
    pub regular_price: f64,
    /// Discount in percent that won (product vs category)
    pub effective_discount: f64,
    /// Discounted unit price
    pub unit_price: f64,
    /// `regular_price * quantity`
    pub line_mrp: f64,
    /// `unit_price * quantity`
    pub line_total: f64,
}

/// `max(product.discount, category_offer)`; an unlisted or missing category offers nothing
pub fn effective_discount(product: &Product, category: Option<&Category>) -> f64 {
    let category_offer = category
        .filter(|c| c.is_listed)
        .map(|c| c.category_offer)
        .unwrap_or(0.0);
    product.discount.max(category_offer).clamp(0.0, 100.0)
}

/// Discounted unit price, rounded to 2 decimal places
pub fn discounted_unit_price(price: f64, discount_percent: f64) -> Decimal {
    let price = to_decimal(price);
    round2(price - percent_of(price, to_decimal(discount_percent)))
}

/// `unit_price * quantity`, rounded
pub fn line_total(unit_price: f64, quantity: u32) -> f64 {
    to_f64(to_decimal(unit_price) * Decimal::from(quantity))
}

/// Price `quantity` units of a product
pub fn price_line(product: &Product, category: Option<&Category>, quantity: u32) -> PricedLine {
    let discount = effective_discount(product, category);
    let unit = discounted_unit_price(product.price, discount);
    let qty = Decimal::from(quantity);

    PricedLine {
        product_id: product.id.clone(),
        product_name: product.name.clone(),
        images: product.images.clone(),
        quantity,
        regular_price: product.price,
        effective_discount: discount,
        unit_price: to_f64(unit),
        line_mrp: to_f64(to_decimal(product.price) * qty),
        line_total: to_f64(unit * qty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: f64, discount: f64) -> Product {
        Product {
            id: "p-1".to_string(),
            name: "Chair".to_string(),
            images: vec!["chair.jpg".to_string()],
            price,
            discount,
            stock: Some(10),
            is_blocked: false,
            category_id: Some("c-1".to_string()),
            created_at: 0,
        }
    }

    fn category(offer: f64) -> Category {
        Category {
            id: "c-1".to_string(),
            name: "Furniture".to_string(),
            category_offer: offer,
            is_listed: true,
        }
    }

    #[test]
    fn test_category_offer_wins_when_larger() {
        let line = price_line(&product(1000.0, 10.0), Some(&category(20.0)), 1);
        assert_eq!(line.effective_discount, 20.0);
        assert_eq!(line.unit_price, 800.0);
        assert_eq!(line.line_total, 800.0);
    }

    #[test]
    fn test_discounts_never_stack() {
        let line = price_line(&product(1000.0, 30.0), Some(&category(20.0)), 2);
        assert_eq!(line.effective_discount, 30.0);
        assert_eq!(line.unit_price, 700.0);
        assert_eq!(line.line_mrp, 2000.0);
        assert_eq!(line.line_total, 1400.0);
    }

    #[test]
    fn test_missing_or_unlisted_category() {
        assert_eq!(effective_discount(&product(100.0, 5.0), None), 5.0);

        let mut hidden = category(50.0);
        hidden.is_listed = false;
        assert_eq!(effective_discount(&product(100.0, 5.0), Some(&hidden)), 5.0);
    }

    #[test]
    fn test_unit_price_rounding() {
        // 99.99 * 0.85 = 84.9915
        let line = price_line(&product(99.99, 15.0), None, 3);
        assert_eq!(line.unit_price, 84.99);
        assert_eq!(line.line_total, 254.97);
    }
}
