use std::sync::Arc;

use mongodb::bson::oid::ObjectId;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product, ProductPatch};

/// Product fields after boundary coercion, before validation.
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    pub category: String,
    pub image: String,
    pub stock: i64,
}

#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(repo: Arc<dyn ProductRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.repo.list().await
    }

    /// Zero-priced products are rejected along with missing names.
    pub async fn create_product(&self, input: ProductInput) -> Result<Product, DomainError> {
        let name = input.name.trim().to_string();
        if name.is_empty() || !input.price.is_finite() || input.price <= 0.0 {
            return Err(DomainError::invalid("name and price required"));
        }

        let product = self
            .repo
            .create(NewProduct {
                name,
                price: input.price,
                category: input.category.trim().to_string(),
                image: input.image.trim().to_string(),
                stock: input.stock.max(0),
            })
            .await?;
        log::info!("Created product {} ({})", product.id, product.name);
        Ok(product)
    }

    pub async fn update_product(&self, id: ObjectId, patch: ProductPatch) -> Result<(), DomainError> {
        let patch = ProductPatch {
            name: patch.name.map(|s| s.trim().to_string()),
            category: patch.category.map(|s| s.trim().to_string()),
            image: patch.image.map(|s| s.trim().to_string()),
            stock: patch.stock.map(|s| s.max(0)),
            price: patch.price,
        };
        if patch.is_empty() {
            return Ok(());
        }
        self.repo.update(id, patch).await
    }

    pub async fn delete_product(&self, id: ObjectId) -> Result<(), DomainError> {
        self.repo.delete(id).await?;
        log::info!("Deleted product {}", id);
        Ok(())
    }
}
