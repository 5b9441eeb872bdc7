use axum::{extract::State, http::StatusCode};
use serde_json::json;

use crate::middleware::ApiResponse;
use crate::AppState;

/// GET /health - Liveness plus storage reachability
pub async fn get(State(state): State<AppState>) -> ApiResponse {
    let now = chrono::Utc::now();

    match state.items.health_check().await {
        Ok(()) => ApiResponse::json(
            StatusCode::OK,
            json!({
                "status": "ok",
                "timestamp": now,
                "storage": "ok"
            }),
        ),
        Err(e) => {
            tracing::warn!("Storage health check failed: {}", e);
            ApiResponse::json(
                StatusCode::SERVICE_UNAVAILABLE,
                json!({
                    "status": "degraded",
                    "timestamp": now,
                    "storage": "unavailable"
                }),
            )
        }
    }
}
