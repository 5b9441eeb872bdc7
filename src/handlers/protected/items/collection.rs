use axum::{
    body::Bytes,
    extract::{Extension, State},
};

use crate::api::parse_request_body;
use crate::database::models::Item;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::validation::ItemShape;
use crate::AppState;

/// GET /items - List every item in the table
pub async fn get(State(state): State<AppState>) -> ApiResult {
    let items = state.items.list().await?;
    Ok(ApiResponse::success(Some(items)))
}

/// POST /items - Create an item, generating its id when the body omits one.
///
/// Returns 409 when an item with the id already exists; the stored item is
/// left untouched.
pub async fn post(
    State(state): State<AppState>,
    auth_user: Option<Extension<AuthUser>>,
    body: Bytes,
) -> ApiResult {
    let mut item: Item = parse_request_body(&body, ItemShape::Create, None)?;
    item.ensure_id();

    state.items.insert_new(&item).await?;

    tracing::debug!(
        item_id = %item.item_id,
        user = auth_user.as_ref().map(|Extension(u)| u.user_id.as_str()).unwrap_or("-"),
        "item created"
    );

    Ok(ApiResponse::created())
}
