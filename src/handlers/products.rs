use actix_web::{web, HttpResponse};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::auth::AdminUser;
use super::coerce::{f64_or_zero, i64_or_zero, present_f64, present_i64, present_string, string_or_empty};
use super::{json_body, parse_id, OkResponse};
use crate::application::product_service::ProductInput;
use crate::domain::product::{Product, ProductPatch};
use crate::errors::AppError;
use crate::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    /// Must be greater than zero. Numeric strings are accepted.
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub price: f64,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub category: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub image: String,
    #[serde(default, deserialize_with = "i64_or_zero")]
    pub stock: i64,
}

impl From<CreateProductRequest> for ProductInput {
    fn from(r: CreateProductRequest) -> Self {
        ProductInput {
            name: r.name,
            price: r.price,
            category: r.category,
            image: r.image,
            stock: r.stock,
        }
    }
}

/// Only the listed fields are recognized; absent or null fields are kept.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    #[serde(default, deserialize_with = "present_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "present_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "present_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "present_i64")]
    pub stock: Option<i64>,
}

impl From<UpdateProductRequest> for ProductPatch {
    fn from(r: UpdateProductRequest) -> Self {
        ProductPatch {
            name: r.name,
            price: r.price,
            category: r.category,
            image: r.image,
            stock: r.stock,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category: String,
    pub image: String,
    pub stock: i64,
    pub created_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id.to_hex(),
            name: p.name,
            price: p.price,
            category: p.category,
            image: p.image,
            stock: p.stock,
            created_at: p.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/products
///
/// Whole catalog, newest first. Public.
#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "All products", body = [ProductResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "products"
)]
pub async fn list_products(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let products = state.products.list_products().await?;
    let body: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing name or non-positive price"),
        (status = 401, description = "Caller is not an admin"),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn create_product(
    AdminUser(admin): AdminUser,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let request: CreateProductRequest = json_body(&body)?;
    log::info!("Admin {} creating product", admin.id);
    let product = state.products.create_product(request.into()).await?;
    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "24-character hex product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Update applied", body = OkResponse),
        (status = 401, description = "Caller is not an admin"),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn update_product(
    AdminUser(admin): AdminUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path.into_inner())?;
    let request: UpdateProductRequest = json_body(&body)?;
    log::info!("Admin {} updating product {}", admin.id, id);
    state.products.update_product(id, request.into()).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}

/// DELETE /api/products/{id}
///
/// Unknown ids succeed as well.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = String, Path, description = "24-character hex product id")),
    responses(
        (status = 200, description = "Deleted (or already absent)", body = OkResponse),
        (status = 401, description = "Caller is not an admin"),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn delete_product(
    AdminUser(admin): AdminUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_id(&path.into_inner())?;
    log::info!("Admin {} deleting product {}", admin.id, id);
    state.products.delete_product(id).await?;
    Ok(HttpResponse::Ok().json(OkResponse::ok()))
}
