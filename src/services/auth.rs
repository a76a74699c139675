use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use rand_core::OsRng;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{Session, User};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("user already exists")]
    EmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid or expired session")]
    InvalidSession,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Register a new user and open a session for them.
/// Emails are unique; a taken email is a user error, not a fault.
pub async fn register(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password: &str,
    session_ttl_days: i64,
) -> Result<(User, Session), AuthError> {
    let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if existing.is_some() {
        return Err(AuthError::EmailTaken);
    }

    let id = Uuid::new_v4().to_string();
    let password_hash = hash_password(password)?;
    let created_at = Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(username)
    .bind(email)
    .bind(&password_hash)
    .bind(&created_at)
    .execute(pool)
    .await?;

    let user = User {
        id,
        username: username.to_string(),
        email: email.to_string(),
        password_hash,
        created_at,
    };

    let session = create_session(pool, &user.id, session_ttl_days).await?;

    Ok((user, session))
}

/// Authenticate by email and password, opening a new session on success.
pub async fn authenticate(
    pool: &SqlitePool,
    email: &str,
    password: &str,
    session_ttl_days: i64,
) -> Result<(User, Session), AuthError> {
    let user: User = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    let session = create_session(pool, &user.id, session_ttl_days).await?;

    Ok((user, session))
}

async fn create_session(
    pool: &SqlitePool,
    user_id: &str,
    ttl_days: i64,
) -> Result<Session, sqlx::Error> {
    let token = Uuid::new_v4().to_string();
    let now = Utc::now();
    let expires_at = (now + Duration::days(ttl_days)).to_rfc3339();
    let created_at = now.to_rfc3339();

    sqlx::query("INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(&created_at)
        .bind(&expires_at)
        .execute(pool)
        .await?;

    Ok(Session {
        token,
        user_id: user_id.to_string(),
        created_at,
        expires_at,
    })
}

/// Validate a bearer token and resolve the owning user.
pub async fn validate_session(pool: &SqlitePool, token: &str) -> Result<User, AuthError> {
    let session: Session = sqlx::query_as("SELECT * FROM sessions WHERE token = ?")
        .bind(token)
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::InvalidSession)?;

    let expires_at = DateTime::parse_from_rfc3339(&session.expires_at)
        .map_err(|_| AuthError::InvalidSession)?;
    if expires_at < Utc::now() {
        return Err(AuthError::InvalidSession);
    }

    let user: User = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&session.user_id)
        .fetch_one(pool)
        .await?;

    Ok(user)
}

/// Delete sessions past their expiry. Returns the number removed.
pub async fn cleanup_expired_sessions(pool: &SqlitePool) -> Result<u64, AuthError> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::migrate(&pool).await.unwrap();
        pool
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let pool = test_pool().await;

        let (user, session) = register(&pool, "aki", "aki@example.com", "secret", 30)
            .await
            .unwrap();
        assert_eq!(user.email, "aki@example.com");
        assert!(!session.token.is_empty());

        let (again, _) = authenticate(&pool, "aki@example.com", "secret", 30)
            .await
            .unwrap();
        assert_eq!(again.id, user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let pool = test_pool().await;

        register(&pool, "aki", "aki@example.com", "secret", 30)
            .await
            .unwrap();
        let err = register(&pool, "other", "aki@example.com", "secret", 30)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_bad_password_rejected() {
        let pool = test_pool().await;

        register(&pool, "aki", "aki@example.com", "secret", 30)
            .await
            .unwrap();
        let err = authenticate(&pool, "aki@example.com", "wrong", 30)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_session_validation_and_expiry() {
        let pool = test_pool().await;

        let (user, session) = register(&pool, "aki", "aki@example.com", "secret", 30)
            .await
            .unwrap();
        let resolved = validate_session(&pool, &session.token).await.unwrap();
        assert_eq!(resolved.id, user.id);

        assert!(matches!(
            validate_session(&pool, "not-a-token").await.unwrap_err(),
            AuthError::InvalidSession
        ));

        // A session created with a negative TTL is already expired
        let (_, stale) = authenticate(&pool, "aki@example.com", "secret", -1)
            .await
            .unwrap();
        assert!(matches!(
            validate_session(&pool, &stale.token).await.unwrap_err(),
            AuthError::InvalidSession
        ));

        let removed = cleanup_expired_sessions(&pool).await.unwrap();
        assert_eq!(removed, 1);
    }
}
