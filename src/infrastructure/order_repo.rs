use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::Collection;

use crate::db::MongoConnector;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, Order, OrderStatus};
use crate::domain::ports::OrderRepository;

use super::models::{to_bson_datetime, LineItemDocument, OrderDocument};
use super::ORDERS;

pub struct MongoOrderRepository {
    conn: Arc<MongoConnector>,
}

impl MongoOrderRepository {
    pub fn new(conn: Arc<MongoConnector>) -> Self {
        Self { conn }
    }

    async fn collection(&self) -> Result<Collection<OrderDocument>, DomainError> {
        Ok(self.conn.database().await?.collection(ORDERS))
    }

    async fn find_newest_first(&self, filter: Document) -> Result<Vec<Order>, DomainError> {
        let docs: Vec<OrderDocument> = self
            .collection()
            .await?
            .find(filter)
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await?
            .try_collect()
            .await?;
        docs.into_iter().map(into_order).collect()
    }
}

fn into_order(document: OrderDocument) -> Result<Order, DomainError> {
    let id = document.id;
    Order::try_from(document)
        .map_err(|e| DomainError::Internal(format!("corrupt order {}: {}", id, e)))
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    async fn list(&self) -> Result<Vec<Order>, DomainError> {
        self.find_newest_first(doc! {}).await
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Order>, DomainError> {
        self.find_newest_first(doc! { "userId": user_id }).await
    }

    async fn create(&self, order: NewOrder) -> Result<Order, DomainError> {
        let document = OrderDocument {
            id: ObjectId::new(),
            user_id: order.user_id,
            email: order.email,
            name: order.recipient.name,
            phone: order.recipient.phone,
            address: order.recipient.address,
            lat: order.recipient.lat,
            lng: order.recipient.lng,
            pay: order.pay,
            note: order.note,
            items: order.priced.items.iter().map(LineItemDocument::from).collect(),
            subtotal: order.priced.subtotal,
            shipping: order.priced.shipping,
            total: order.priced.total,
            status: OrderStatus::Pending,
            created_at: to_bson_datetime(Utc::now()),
        };
        self.collection().await?.insert_one(&document).await?;
        into_order(document)
    }

    async fn update_status(&self, id: ObjectId, status: OrderStatus) -> Result<(), DomainError> {
        self.collection()
            .await?
            .update_one(doc! { "_id": id }, doc! { "$set": { "status": status.as_str() } })
            .await?;
        Ok(())
    }
}
