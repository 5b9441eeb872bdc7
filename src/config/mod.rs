use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Scope the identity provider grants to signed-in users
pub const DEFAULT_REQUIRED_SCOPE: &str = "aws.cognito.signin.user.admin";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable missing")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub region: String,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub log_filter: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreKind {
    DynamoDb,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub kind: StoreKind,
    pub table_name: String,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub enabled: bool,
    pub user_pool_id: String,
    pub required_scope: String,
    #[serde(skip_serializing)]
    pub jwt_secret: Option<String>,
}

impl AuthConfig {
    /// Token issuer for the configured user pool
    pub fn issuer(&self, region: &str) -> String {
        format!("https://cognito-idp.{}.amazonaws.com/{}", region, self.user_pool_id)
    }

    pub fn jwks_url(&self, region: &str) -> String {
        format!("{}/.well-known/jwks.json", self.issuer(region))
    }
}

impl AppConfig {
    /// Build configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source. Required
    /// variables fail fast; optional ones fall back to environment defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let region = var("REGION").ok_or(ConfigError::Missing("REGION"))?;
        let user_pool_id =
            var("COGNITO_USER_POOL_ID").ok_or(ConfigError::Missing("COGNITO_USER_POOL_ID"))?;
        let table_name = var("ITEM_TABLE").ok_or(ConfigError::Missing("ITEM_TABLE"))?;

        let environment = match var("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let port = match var("ITEMS_API_PORT").or_else(|| var("PORT")) {
            Some(v) => v
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "ITEMS_API_PORT", value: v })?,
            None => 3000,
        };

        let kind = match var("ITEM_STORE").as_deref() {
            None | Some("dynamodb") => StoreKind::DynamoDb,
            Some("memory") => StoreKind::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "ITEM_STORE",
                    value: other.to_string(),
                })
            }
        };

        let auth_disabled = match var("AUTH_DISABLED") {
            Some(v) => v
                .parse::<bool>()
                .map_err(|_| ConfigError::Invalid { name: "AUTH_DISABLED", value: v })?,
            None => false,
        };

        let log_filter = var("RUST_LOG").unwrap_or_else(|| match environment {
            Environment::Development => "items_api=debug,tower_http=debug".to_string(),
            Environment::Staging => "items_api=info,tower_http=info".to_string(),
            Environment::Production => "items_api=warn,tower_http=warn".to_string(),
        });

        Ok(Self {
            environment,
            region,
            server: ServerConfig { port, log_filter },
            storage: StorageConfig {
                kind,
                table_name,
                endpoint_url: var("DYNAMODB_ENDPOINT_URL"),
            },
            auth: AuthConfig {
                enabled: !auth_disabled,
                user_pool_id,
                required_scope: var("AUTH_REQUIRED_SCOPE")
                    .unwrap_or_else(|| DEFAULT_REQUIRED_SCOPE.to_string()),
                jwt_secret: var("AUTH_JWT_SECRET"),
            },
        })
    }
}
