use chrono::{DateTime, Utc};
use mongodb::bson;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::order::{LineItem, Order, OrderStatus, Recipient};
use crate::domain::product::Product;

pub fn to_bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

/// A stored document that does not map onto a domain value.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("bad object id: {0}")]
    BadId(#[from] bson::oid::Error),
    #[error("timestamp out of range: {0}ms")]
    BadTimestamp(i64),
}

pub fn from_bson_datetime(dt: bson::DateTime) -> Result<DateTime<Utc>, DocumentError> {
    let millis = dt.timestamp_millis();
    DateTime::from_timestamp_millis(millis).ok_or(DocumentError::BadTimestamp(millis))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub stock: i64,
    pub created_at: bson::DateTime,
}

impl TryFrom<ProductDocument> for Product {
    type Error = DocumentError;

    fn try_from(d: ProductDocument) -> Result<Self, Self::Error> {
        Ok(Product {
            id: d.id,
            name: d.name,
            price: d.price,
            category: d.category,
            image: d.image,
            stock: d.stock,
            created_at: from_bson_datetime(d.created_at)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemDocument {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub qty: i32,
}

impl TryFrom<LineItemDocument> for LineItem {
    type Error = DocumentError;

    fn try_from(d: LineItemDocument) -> Result<Self, Self::Error> {
        Ok(LineItem {
            product_id: ObjectId::parse_str(&d.id)?,
            name: d.name,
            price: d.price,
            qty: d.qty.max(0) as u32,
        })
    }
}

impl From<&LineItem> for LineItemDocument {
    fn from(l: &LineItem) -> Self {
        LineItemDocument {
            id: l.product_id.to_hex(),
            name: l.name.clone(),
            price: l.price,
            qty: l.qty as i32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<String>,
    #[serde(default)]
    pub pay: String,
    #[serde(default)]
    pub note: String,
    pub items: Vec<LineItemDocument>,
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: bson::DateTime,
}

impl TryFrom<OrderDocument> for Order {
    type Error = DocumentError;

    fn try_from(d: OrderDocument) -> Result<Self, Self::Error> {
        let items = d
            .items
            .into_iter()
            .map(LineItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Order {
            id: d.id,
            user_id: d.user_id,
            email: d.email,
            recipient: Recipient {
                name: d.name,
                phone: d.phone,
                address: d.address,
                lat: d.lat,
                lng: d.lng,
            },
            pay: d.pay,
            note: d.note,
            items,
            subtotal: d.subtotal,
            shipping: d.shipping,
            total: d.total,
            status: d.status,
            created_at: from_bson_datetime(d.created_at)?,
        })
    }
}
