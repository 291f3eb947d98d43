//! Category Model

use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Category-wide offer in percent; competes with the product discount
    #[serde(default)]
    pub category_offer: f64,
    #[serde(default = "default_true")]
    pub is_listed: bool,
}

fn default_true() -> bool {
    true
}

/// Create or replace category payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryUpsert {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub category_offer: f64,
    #[serde(default = "default_true")]
    pub is_listed: bool,
}
