use serde::{Deserialize, Serialize};

/// A catalog product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub image: String,
}

impl Product {
    pub fn new(id: i64, name: &str, price: i64, image: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            price,
            image: image.to_string(),
        }
    }
}
