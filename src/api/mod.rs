use axum::http::{header, HeaderMap};
use axum::Router;
use std::sync::Arc;

use crate::models::User;
use crate::AppState;

mod auth;
mod catalog;
mod error;
mod items;
mod translate;

pub use error::ApiError;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/auth", auth::routes())
        .nest("/items", items::routes())
        .nest("/catalog", catalog::routes())
        .nest("/translate", translate::routes())
}

/// Extract the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))
}

/// Resolve the authenticated user for a request. Every item, catalog and
/// translate route goes through this.
async fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let token = bearer_token(headers)?;
    let user = crate::services::auth::validate_session(&state.db, token).await?;
    Ok(user)
}
