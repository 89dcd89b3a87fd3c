use std::sync::Arc;

use mongodb::bson::oid::ObjectId;

use crate::domain::errors::DomainError;
use crate::domain::identity::AuthUser;
use crate::domain::order::{
    distinct_product_ids, price_items, NewOrder, Order, OrderStatus, Recipient, RequestedItem,
};
use crate::domain::ports::{OrderRepository, ProductRepository};

/// Checkout form after boundary coercion.
#[derive(Debug, Clone, Default)]
pub struct CheckoutInput {
    pub recipient: Recipient,
    pub pay: String,
    pub note: String,
    pub items: Vec<RequestedItem>,
}

#[derive(Clone)]
pub struct OrderService {
    products: Arc<dyn ProductRepository>,
    orders: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(products: Arc<dyn ProductRepository>, orders: Arc<dyn OrderRepository>) -> Self {
        Self { products, orders }
    }

    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        self.orders.list().await
    }

    pub async fn list_orders_for(&self, user: &AuthUser) -> Result<Vec<Order>, DomainError> {
        self.orders.list_for_user(&user.id).await
    }

    /// Place an order for `user`.
    ///
    /// Prices are read from the catalog and the order is written in a second
    /// step; a price change between the two is not detected.
    pub async fn place_order(&self, user: &AuthUser, input: CheckoutInput) -> Result<Order, DomainError> {
        if input.items.is_empty() {
            return Err(DomainError::invalid("cart empty"));
        }

        let ids = distinct_product_ids(&input.items);
        let catalog = if ids.is_empty() {
            Vec::new()
        } else {
            self.products.find_by_ids(&ids).await?
        };
        let priced = price_items(&input.items, &catalog)?;

        let recipient = Recipient {
            name: input.recipient.name.trim().to_string(),
            phone: input.recipient.phone.trim().to_string(),
            address: input.recipient.address.trim().to_string(),
            ..input.recipient
        };
        if recipient.address.is_empty() {
            return Err(DomainError::invalid("address required"));
        }

        let order = self
            .orders
            .create(NewOrder {
                user_id: user.id.clone(),
                email: user.email.clone().unwrap_or_default(),
                recipient,
                pay: input.pay.trim().to_string(),
                note: input.note.trim().to_string(),
                priced,
            })
            .await?;
        log::info!(
            "Order {} placed by {} ({} lines, total {})",
            order.id,
            order.user_id,
            order.items.len(),
            order.total
        );
        Ok(order)
    }

    /// Any status may follow any other.
    pub async fn set_status(&self, id: ObjectId, raw_status: &str) -> Result<OrderStatus, DomainError> {
        let status: OrderStatus = raw_status.parse()?;
        self.orders.update_status(id, status).await?;
        log::info!("Order {} set to {}", id, status);
        Ok(status)
    }
}
