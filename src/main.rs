use anyhow::Context;
use tracing_subscriber::EnvFilter;

use items_api::{app, config::AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up REGION, ITEM_TABLE, etc.
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.server.log_filter))
        .init();
    tracing::info!("Starting items API in {:?} mode", config.environment);

    let state = AppState::from_config(&config).await?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    println!("🚀 Items API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
