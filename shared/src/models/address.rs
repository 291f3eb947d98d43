//! Shipping address snapshot

use serde::{Deserialize, Serialize};

/// Address copied into an order at placement time; never edited afterwards
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub town: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
}
