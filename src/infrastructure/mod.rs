pub mod identity_client;
pub mod models;
pub mod order_repo;
pub mod product_repo;

use crate::domain::errors::DomainError;

pub const PRODUCTS: &str = "products";
pub const ORDERS: &str = "orders";

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<mongodb::error::Error> for DomainError {
    fn from(e: mongodb::error::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}
