use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use super::{require_user, ApiError};
use crate::models::Item;
use crate::services::items::{self, ItemPatch, NewItem};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route(
            "/:id",
            axum::routing::put(update_item).delete(delete_item),
        )
}

async fn list_items(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Item>>, ApiError> {
    let user = require_user(&state, &headers).await?;

    let items = items::list_items(&state.db, &user.id, state.config.inactivity_days).await?;

    Ok(Json(items))
}

async fn create_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<NewItem>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let user = require_user(&state, &headers).await?;

    let item = items::create_item(&state.db, &user.id, payload).await?;

    Ok((StatusCode::CREATED, Json(item)))
}

async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<ItemPatch>,
) -> Result<Json<Item>, ApiError> {
    let user = require_user(&state, &headers).await?;

    let item = items::update_item(&state.db, &user.id, &id, patch).await?;

    Ok(Json(item))
}

async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = require_user(&state, &headers).await?;

    items::delete_item(&state.db, &user.id, &id).await?;

    Ok(Json(json!({ "message": "item deleted" })))
}
