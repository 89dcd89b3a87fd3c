use actix_web::{web, HttpResponse};
use chrono::SecondsFormat;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::auth::{AdminUser, CurrentUser};
use super::coerce::{array_or_empty, optional_i64, optional_string, string_or_empty};
use super::{json_body, parse_id, OkResponse};
use crate::application::order_service::CheckoutInput;
use crate::domain::order::{LineItem, Order, Recipient, RequestedItem};
use crate::errors::AppError;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

/// A cart line. Any `price` or `name` the client sends is ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CartItemRequest {
    /// 24-character hex product id.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub id: String,
    /// Clamped to 1..=99; zero, negative or non-numeric drops the line.
    #[serde(default, deserialize_with = "optional_i64")]
    #[schema(value_type = Option<i64>)]
    pub qty: Option<i64>,
}

impl CartItemRequest {
    /// Entries that are not objects become an empty line, which pricing drops.
    fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

impl From<CartItemRequest> for RequestedItem {
    fn from(r: CartItemRequest) -> Self {
        RequestedItem {
            product_id: ObjectId::parse_str(&r.id).ok(),
            qty: r.qty,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub phone: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "optional_string")]
    pub lat: Option<String>,
    #[serde(default, deserialize_with = "optional_string")]
    pub lng: Option<String>,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub pay: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub note: String,
    /// Anything but an array counts as an empty cart.
    #[serde(default, deserialize_with = "array_or_empty")]
    #[schema(value_type = Vec<CartItemRequest>)]
    pub items: Vec<Value>,
}

impl From<CreateOrderRequest> for CheckoutInput {
    fn from(r: CreateOrderRequest) -> Self {
        CheckoutInput {
            recipient: Recipient {
                name: r.name,
                phone: r.phone,
                address: r.address,
                lat: r.lat,
                lng: r.lng,
            },
            pay: r.pay,
            note: r.note,
            items: r
                .items
                .into_iter()
                .map(|v| RequestedItem::from(CartItemRequest::from_value(v)))
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// One of pending, processing, delivered, cancelled (any case).
    #[serde(default, deserialize_with = "string_or_empty")]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LineItemResponse {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub qty: u32,
}

impl From<LineItem> for LineItemResponse {
    fn from(l: LineItem) -> Self {
        LineItemResponse {
            id: l.product_id.to_hex(),
            name: l.name,
            price: l.price,
            qty: l.qty,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lng: Option<String>,
    pub pay: String,
    pub note: String,
    pub items: Vec<LineItemResponse>,
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
    /// pending | processing | delivered | cancelled
    pub status: String,
    pub created_at: String,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        OrderResponse {
            id: o.id.to_hex(),
            user_id: o.user_id,
            email: o.email,
            name: o.recipient.name,
            phone: o.recipient.phone,
            address: o.recipient.address,
            lat: o.recipient.lat,
            lng: o.recipient.lng,
            pay: o.pay,
            note: o.note,
            items: o.items.into_iter().map(LineItemResponse::from).collect(),
            subtotal: o.subtotal,
            shipping: o.shipping,
            total: o.total,
            status: o.status.to_string(),
            created_at: o.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

fn order_list(orders: Vec<Order>) -> HttpResponse {
    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    HttpResponse::Ok().json(body)
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/orders
///
/// Every order in the store, newest first.
#[utoipa::path(
    get,
    path = "/api/orders",
    responses(
        (status = 200, description = "All orders", body = [OrderResponse]),
        (status = 401, description = "Caller is not an admin"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    Ok(order_list(state.orders.list_orders().await?))
}

/// GET /api/my-orders
#[utoipa::path(
    get,
    path = "/api/my-orders",
    responses(
        (status = 200, description = "Orders placed by the caller", body = [OrderResponse]),
        (status = 401, description = "Not signed in"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn list_my_orders(
    CurrentUser(user): CurrentUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    Ok(order_list(state.orders.list_orders_for(&user).await?))
}

/// POST /api/orders
///
/// Prices every line from the catalog, computes shipping and totals, and
/// stores the order as pending.
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Empty cart, no valid items or missing address"),
        (status = 401, description = "Not signed in"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn create_order(
    CurrentUser(user): CurrentUser,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let request: CreateOrderRequest = json_body(&body)?;
    let order = state.orders.place_order(&user, request.into()).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /api/orders/{id}
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = String, Path, description = "24-character hex order id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = OkResponse),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Caller is not an admin"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn update_order_status(
    AdminUser(admin): AdminUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path.into_inner())?;
    let request: UpdateStatusRequest = json_body(&body)?;
    log::info!("Admin {} setting status of order {}", admin.id, id);
    state.orders.set_status(id, &request.status).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}
