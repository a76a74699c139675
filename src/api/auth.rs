use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ApiError;
use crate::{services::auth, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub token: String,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let username = req.username.trim();
    let email = req.email.trim();

    if username.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "username, email and password are required".to_string(),
        ));
    }

    let (user, session) = auth::register(
        &state.db,
        username,
        email,
        &req.password,
        state.config.session_ttl_days,
    )
    .await?;

    tracing::info!("Registered user {} ({})", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            token: session.token,
        }),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let (user, session) = auth::authenticate(
        &state.db,
        req.email.trim(),
        &req.password,
        state.config.session_ttl_days,
    )
    .await?;

    Ok(Json(AuthResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        token: session.token,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{register_user, send, test_app};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_register_login_round_trip() {
        let (app, _pool) = test_app().await;

        let token = register_user(&app, "aki").await;
        assert!(!token.is_empty());

        let (status, body) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "aki@example.com", "password": "secret" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "aki");
        assert!(body.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_bad_request() {
        let (app, _pool) = test_app().await;

        register_user(&app, "aki").await;
        let (status, body) = send(
            &app,
            "POST",
            "/auth/register",
            None,
            Some(json!({
                "username": "other",
                "email": "aki@example.com",
                "password": "secret",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "user already exists");
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let (app, _pool) = test_app().await;

        let (status, _) = send(
            &app,
            "POST",
            "/auth/register",
            None,
            Some(json!({ "username": " ", "email": "a@b.c", "password": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let (app, _pool) = test_app().await;

        register_user(&app, "aki").await;
        let (status, _) = send(
            &app,
            "POST",
            "/auth/login",
            None,
            Some(json!({ "email": "aki@example.com", "password": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
