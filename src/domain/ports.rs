use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use super::errors::DomainError;
use super::identity::AuthUser;
use super::order::{NewOrder, Order, OrderStatus};
use super::product::{NewProduct, Product, ProductPatch};

#[async_trait]
pub trait ProductRepository: Send + Sync + 'static {
    /// All products, newest id first.
    async fn list(&self) -> Result<Vec<Product>, DomainError>;
    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Product>, DomainError>;
    async fn create(&self, product: NewProduct) -> Result<Product, DomainError>;
    async fn update(&self, id: ObjectId, patch: ProductPatch) -> Result<(), DomainError>;
    /// Deleting an unknown id is not an error.
    async fn delete(&self, id: ObjectId) -> Result<(), DomainError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<Order>, DomainError>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError>;
    async fn create(&self, order: NewOrder) -> Result<Order, DomainError>;
    async fn update_status(&self, id: ObjectId, status: OrderStatus) -> Result<(), DomainError>;
}

/// Exchanges a bearer token for the user it belongs to.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// `Ok(None)` when the service rejects the token.
    async fn user_for_token(&self, token: &str) -> Result<Option<AuthUser>, DomainError>;
}
