use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::product::Product;

pub const MIN_QUANTITY: i64 = 1;
pub const MAX_QUANTITY: i64 = 99;
/// Subtotals strictly above this ship for free.
pub const FREE_SHIPPING_THRESHOLD: f64 = 500.0;
pub const FLAT_SHIPPING_FEE: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processing" => Ok(OrderStatus::Processing),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(DomainError::invalid("invalid status")),
        }
    }
}

/// Snapshot of a product taken when the order is placed.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub product_id: ObjectId,
    pub name: String,
    pub price: f64,
    pub qty: u32,
}

/// One cart entry as submitted by the client, after boundary coercion.
/// `product_id` is `None` when the submitted id was not a valid object id.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedItem {
    pub product_id: Option<ObjectId>,
    pub qty: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedItems {
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recipient {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: String,
    pub email: String,
    pub recipient: Recipient,
    pub pay: String,
    pub note: String,
    pub priced: PricedItems,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: ObjectId,
    pub user_id: String,
    pub email: String,
    pub recipient: Recipient,
    pub pay: String,
    pub note: String,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Clamp a requested quantity to `[MIN_QUANTITY, MAX_QUANTITY]`.
///
/// Missing or non-positive quantities are not rounded up: they yield `None`
/// and the line is dropped.
pub fn clamp_quantity(raw: Option<i64>) -> Option<u32> {
    match raw {
        Some(q) if q >= MIN_QUANTITY => Some(q.min(MAX_QUANTITY) as u32),
        _ => None,
    }
}

pub fn shipping_fee(subtotal: f64) -> f64 {
    if subtotal > FREE_SHIPPING_THRESHOLD {
        0.0
    } else {
        FLAT_SHIPPING_FEE
    }
}

/// Price a cart against the authoritative catalog.
///
/// Prices always come from `catalog`; whatever the client sent is never
/// consulted. Lines with an unknown product or an invalid quantity are
/// dropped. Fails when nothing survives.
pub fn price_items(
    requested: &[RequestedItem],
    catalog: &[Product],
) -> Result<PricedItems, DomainError> {
    let by_id: HashMap<ObjectId, &Product> = catalog.iter().map(|p| (p.id, p)).collect();

    let mut items = Vec::with_capacity(requested.len());
    let mut subtotal = 0.0;
    for req in requested {
        let Some(qty) = clamp_quantity(req.qty) else {
            continue;
        };
        let Some(product) = req.product_id.and_then(|id| by_id.get(&id)) else {
            continue;
        };
        subtotal += product.price * f64::from(qty);
        items.push(LineItem {
            product_id: product.id,
            name: product.name.clone(),
            price: product.price,
            qty,
        });
    }

    if items.is_empty() {
        return Err(DomainError::invalid("no valid items"));
    }

    let shipping = shipping_fee(subtotal);
    Ok(PricedItems {
        items,
        subtotal,
        shipping,
        total: subtotal + shipping,
    })
}

/// Distinct product ids referenced by a cart, in first-seen order.
pub fn distinct_product_ids(requested: &[RequestedItem]) -> Vec<ObjectId> {
    let mut ids: Vec<ObjectId> = Vec::new();
    for id in requested.iter().filter_map(|r| r.product_id) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}
