use axum::{
    body::Bytes,
    extract::{Path, State},
};

use crate::api::{parse_request_body, PathIdentifier};
use crate::database::models::{Item, ItemPatch, ITEM_KEY};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::ItemShape;
use crate::AppState;

/// GET /items/:itemId - Fetch one item; an unknown id yields 200 with no body
pub async fn get(State(state): State<AppState>, Path(item_id): Path<String>) -> ApiResult {
    let item = state.items.get_by_key(&item_id).await?;
    Ok(ApiResponse::success(item))
}

/// PUT /items/:itemId - Upsert the full item
pub async fn put(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let path = PathIdentifier::new(ITEM_KEY, Some(item_id.as_str()));
    let item: Item = parse_request_body(&body, ItemShape::Replace, Some(path))?;

    state.items.insert_or_replace(&item).await?;
    Ok(ApiResponse::success(Some(item)))
}

/// PATCH /items/:itemId - Merge the supplied fields into the stored item
pub async fn patch(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    body: Bytes,
) -> ApiResult {
    let path = PathIdentifier::new(ITEM_KEY, Some(item_id.as_str()));
    let changes: ItemPatch = parse_request_body(&body, ItemShape::PartialUpdate, Some(path))?;

    let merged = state.items.partial_update(&changes).await?;
    Ok(ApiResponse::success(Some(merged)))
}

/// DELETE /items/:itemId - Remove an item and return its prior value
pub async fn delete(State(state): State<AppState>, Path(item_id): Path<String>) -> ApiResult {
    if item_id.is_empty() {
        return Err(ApiError::bad_request("Invalid request: missing itemId"));
    }

    let deleted = state.items.delete(&item_id).await?;
    Ok(ApiResponse::success(deleted))
}
