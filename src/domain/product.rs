use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ObjectId,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub image: String,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
}

/// Validated product ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub image: String,
    pub stock: i64,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub stock: Option<i64>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.category.is_none()
            && self.image.is_none()
            && self.stock.is_none()
    }
}
