use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::errors::DomainError;
use crate::domain::identity::AuthUser;
use crate::domain::ports::IdentityProvider;

/// Client for a hosted auth service exposing `GET {base}/auth/v1/user`.
///
/// The public (anon) key goes in the `apikey` header, the caller's token as a
/// bearer credential.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl HttpIdentityProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn user_url(&self) -> String {
        format!("{}/auth/v1/user", self.base_url)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn user_for_token(&self, token: &str) -> Result<Option<AuthUser>, DomainError> {
        let resp = self
            .client
            .get(self.user_url())
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = resp.status();
        if status.is_client_error() {
            log::debug!("Identity service rejected token ({})", status);
            return Ok(None);
        }
        if status != StatusCode::OK {
            return Err(DomainError::Internal(format!(
                "identity service responded {}",
                status
            )));
        }

        let payload: UserPayload = resp.json().await?;
        Ok(Some(AuthUser {
            id: payload.id,
            email: payload.email,
        }))
    }
}
