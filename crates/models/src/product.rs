use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Product {
    #[serde(default = "Product::generate_id")]
    pub id: Thing,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    /// `/uploads/...` path of the stored image, or empty when none was given.
    #[serde(default)]
    pub image: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    fn generate_id() -> Thing {
        Thing::from(("products".to_string(), Uuid::new_v4().to_string()))
    }

    pub fn new(
        name: String,
        description: String,
        price: f64,
        category: String,
        image: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Self::generate_id(),
            name,
            description,
            price,
            category,
            image,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public view with a plain-string id.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.id.to_string(),
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            image: product.image,
        }
    }
}
