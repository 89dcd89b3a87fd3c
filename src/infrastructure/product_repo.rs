use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::Collection;

use crate::db::MongoConnector;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product, ProductPatch};

use super::models::{to_bson_datetime, ProductDocument};
use super::PRODUCTS;

pub struct MongoProductRepository {
    conn: Arc<MongoConnector>,
}

impl MongoProductRepository {
    pub fn new(conn: Arc<MongoConnector>) -> Self {
        Self { conn }
    }

    async fn collection(&self) -> Result<Collection<ProductDocument>, DomainError> {
        Ok(self.conn.database().await?.collection(PRODUCTS))
    }
}

fn into_product(document: ProductDocument) -> Result<Product, DomainError> {
    let id = document.id;
    Product::try_from(document)
        .map_err(|e| DomainError::Internal(format!("corrupt product {}: {}", id, e)))
}

fn patch_to_set(patch: ProductPatch) -> Document {
    let mut set = Document::new();
    if let Some(name) = patch.name {
        set.insert("name", name);
    }
    if let Some(price) = patch.price {
        set.insert("price", price);
    }
    if let Some(category) = patch.category {
        set.insert("category", category);
    }
    if let Some(image) = patch.image {
        set.insert("image", image);
    }
    if let Some(stock) = patch.stock {
        set.insert("stock", stock);
    }
    set
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    async fn list(&self) -> Result<Vec<Product>, DomainError> {
        let docs: Vec<ProductDocument> = self
            .collection()
            .await?
            .find(doc! {})
            .sort(doc! { "_id": -1 })
            .await?
            .try_collect()
            .await?;
        docs.into_iter().map(into_product).collect()
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Product>, DomainError> {
        let docs: Vec<ProductDocument> = self
            .collection()
            .await?
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?
            .try_collect()
            .await?;
        docs.into_iter().map(into_product).collect()
    }

    async fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let document = ProductDocument {
            id: ObjectId::new(),
            name: product.name,
            price: product.price,
            category: product.category,
            image: product.image,
            stock: product.stock,
            created_at: to_bson_datetime(Utc::now()),
        };
        self.collection().await?.insert_one(&document).await?;
        into_product(document)
    }

    async fn update(&self, id: ObjectId, patch: ProductPatch) -> Result<(), DomainError> {
        let set = patch_to_set(patch);
        if set.is_empty() {
            return Ok(());
        }
        self.collection()
            .await?
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(())
    }

    async fn delete(&self, id: ObjectId) -> Result<(), DomainError> {
        self.collection().await?.delete_one(doc! { "_id": id }).await?;
        Ok(())
    }
}
