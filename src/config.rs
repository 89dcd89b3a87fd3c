use std::env;

use thiserror::Error;

use crate::domain::identity::AdminPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Settings read from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub auth_url: String,
    pub auth_anon_key: String,
    pub admin: AdminPolicy,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => 8080,
        };

        let allow_unconfigured = match get("ADMIN_ALLOW_UNCONFIGURED").as_deref() {
            None | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "ADMIN_ALLOW_UNCONFIGURED",
                    value: other.to_string(),
                })
            }
        };

        let admin = AdminPolicy {
            email: get("ADMIN_EMAIL"),
            device_fp: get("ADMIN_DEVICE_FP"),
            ips: get("ADMIN_IPS")
                .map(|raw| parse_ip_list(&raw))
                .unwrap_or_default(),
            allow_unconfigured,
        };

        Ok(Self {
            mongodb_uri: require("MONGODB_URI")?,
            mongodb_db: get("MONGODB_DB").unwrap_or_else(|| "storefront".to_string()),
            auth_url: require("AUTH_URL")?,
            auth_anon_key: require("AUTH_ANON_KEY")?,
            admin,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
        })
    }
}

fn parse_ip_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(String::from)
        .collect()
}
