//! Pricing Engine
//!
//! Effective discounts, line pricing, and the cart/checkout/order summary with
//! the free-shipping threshold.

mod item_calculator;
mod order_calculator;

pub use item_calculator::*;
pub use order_calculator::*;
