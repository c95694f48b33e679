use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

/// One cart per user, keyed by the user id so lookups and upserts address
/// the record directly.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Cart {
    /// Record id is derived from the user id at upsert time; never sent back
    /// out or forward to the store.
    #[serde(skip_serializing, default)]
    pub id: Option<Thing>,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            id: None,
            user_id: user_id.into(),
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CartItem {
    #[serde(rename = "productId")]
    pub product_id: String,
    #[serde(rename = "productPrice")]
    pub product_price: f64,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct AddToCartInput {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "productId")]
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct RemoveFromCartInput {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "productId")]
    pub product_id: String,
}
