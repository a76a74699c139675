use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::{require_user, ApiError};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(translate))
}

#[derive(Debug, Deserialize)]
struct TranslateRequest {
    text: Option<String>,
}

async fn translate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_user(&state, &headers).await?;

    let text = req.text.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ApiError::Validation("text is required".to_string()));
    }

    let translation = state.translate.translate(&text).await;

    Ok(Json(json!({ "translation": translation })))
}
