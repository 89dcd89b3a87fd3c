pub mod auth;
pub mod coerce;
pub mod health;
pub mod orders;
pub mod products;

use actix_web::HttpResponse;
use mongodb::bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::AppError;

/// Body of mutations that return no document.
#[derive(Debug, Serialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Route-level ids are already constrained to 24 lowercase hex characters.
pub fn parse_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::NotFound)
}

/// Fallback for every unmatched path/method combination.
pub async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound)
}

/// Decode a JSON request body regardless of its declared content type.
///
/// Handlers call this after their auth extractor has resolved. An empty
/// body decodes as `T::default()`.
pub fn json_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        log::debug!("Rejected request body: {}", e);
        AppError::BadRequest(format!("invalid request body: {}", e))
    })
}
