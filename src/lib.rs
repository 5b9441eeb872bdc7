use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod validation;

use auth::TokenVerifier;
use config::{AppConfig, StoreKind};
use database::models::{Item, ITEM_KEY};
use database::{DynamoTable, MemoryTable, Repository, Table};

/// Shared request-handling context, built once at startup
#[derive(Clone, Debug)]
pub struct AppState {
    pub items: Repository<Item>,
    /// `None` when authentication is enforced upstream
    pub verifier: Option<Arc<TokenVerifier>>,
}

impl AppState {
    pub fn new(table: Arc<dyn Table>, verifier: Option<TokenVerifier>) -> Self {
        Self {
            items: Repository::new(table),
            verifier: verifier.map(Arc::new),
        }
    }

    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let table: Arc<dyn Table> = match config.storage.kind {
            StoreKind::DynamoDb => {
                let table = DynamoTable::connect(
                    &config.region,
                    config.storage.endpoint_url.as_deref(),
                    &config.storage.table_name,
                    ITEM_KEY,
                )
                .await;
                tracing::info!(table = table.table_name(), region = %config.region, "Using DynamoDB item store");
                Arc::new(table)
            }
            StoreKind::Memory => {
                tracing::warn!("Using in-memory item store; data is lost on exit");
                Arc::new(MemoryTable::new(ITEM_KEY))
            }
        };

        let auth = &config.auth;
        let verifier = if !auth.enabled {
            tracing::warn!("Token verification disabled");
            None
        } else if let Some(secret) = &auth.jwt_secret {
            Some(TokenVerifier::with_secret(secret, &auth.required_scope))
        } else {
            let verifier = TokenVerifier::fetch(
                &auth.jwks_url(&config.region),
                &auth.issuer(&config.region),
                &auth.required_scope,
            )
            .await
            .context("failed to load identity provider signing keys")?;
            Some(verifier)
        };

        Ok(Self::new(table, verifier))
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/health", get(handlers::health_get))
        // Protected API
        .merge(item_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn item_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::items;

    Router::new()
        .route("/items", get(items::items_get).post(items::items_post))
        .route(
            "/items/:item_id",
            get(items::item_get)
                .put(items::item_put)
                .patch(items::item_patch)
                .delete(items::item_delete),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::jwt_auth_middleware,
        ))
}
