use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::domain::identity::{AuthUser, RequestMeta};
use crate::errors::AppError;
use crate::AppState;

const BEARER_PREFIX: &str = "Bearer ";
pub const DEVICE_FP_HEADER: &str = "x-device-fp";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Any caller with a token the identity service accepts.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

/// A caller that also passes the admin allowlist.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub fn request_meta(req: &HttpRequest) -> RequestMeta {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    RequestMeta {
        device_fp: header(DEVICE_FP_HEADER),
        forwarded_for: header(FORWARDED_FOR_HEADER),
    }
}

/// Resolve the caller; any failure along the way means anonymous.
pub async fn resolve_identity(req: &HttpRequest, state: &AppState) -> Option<AuthUser> {
    let token = bearer_token(req)?;
    match state.identity.user_for_token(token).await {
        Ok(user) => user,
        Err(e) => {
            log::warn!("Identity lookup failed: {}", e);
            None
        }
    }
}

fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::Internal("application state not configured".to_string()))
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let state = app_state(&req)?;
            resolve_identity(&req, &state)
                .await
                .map(CurrentUser)
                .ok_or(AppError::Unauthorized)
        })
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let state = app_state(&req)?;
            let user = resolve_identity(&req, &state).await;
            let meta = request_meta(&req);
            match state.admin.authorize(user.as_ref(), &meta) {
                Ok(()) => user.map(AdminUser).ok_or(AppError::Unauthorized),
                Err(reason) => {
                    log::warn!("Admin access denied on {}: {}", req.path(), reason);
                    Err(AppError::Unauthorized)
                }
            }
        })
    }
}
