use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use tracing::{error, info};

use chirpy_db::{Database, StoreError};
use chirpy_types::api::{LoginRequest, LoginResponse, RefreshResponse, UserResponse};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// Shared secret the billing provider sends as `Authorization: ApiKey ...`.
    pub polka_key: String,
    /// Static file server hits since start or last reset.
    pub hits: AtomicUsize,
}

impl AppStateInner {
    pub fn new(db: Database, polka_key: impl Into<String>) -> AppState {
        Arc::new(Self {
            db,
            polka_key: polka_key.into(),
            hits: AtomicUsize::new(0),
        })
    }
}

/// Run a blocking store call off the async runtime.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> chirpy_db::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.to_string())
        })?
        .map_err(ApiError::from)
}

/// Token from an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Hash with Argon2id and a fresh salt.
pub(crate) fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> Result<(), ApiError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| ApiError::Internal(format!("stored hash unreadable: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| bad_credentials())
}

fn bad_credentials() -> ApiError {
    ApiError::Unauthorized("incorrect email or password".into())
}

/// POST /api/login: verify credentials, issue a refresh token and a first
/// access token.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.clone();
    let user = with_db(&state, move |db| db.get_user_by_email(&email))
        .await
        .map_err(|e| match e {
            ApiError::Store(StoreError::UserNotFound) => bad_credentials(),
            other => other,
        })?;

    verify_password(&req.password, &user.password)?;

    let user_id = user.id;
    let (refresh_token, token) = with_db(&state, move |db| {
        let refresh = db.issue_refresh_token(user_id)?;
        let access = db.mint_access_token(&refresh)?;
        Ok((refresh, access))
    })
    .await?;

    info!("User {} logged in", user_id);
    Ok(Json(LoginResponse {
        user: UserResponse::from(user),
        token,
        refresh_token,
    }))
}

/// POST /api/refresh: exchange the bearer refresh token for an access token.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?
        .to_string();

    let token = with_db(&state, move |db| db.mint_access_token(&refresh))
        .await
        .map_err(|e| match e {
            ApiError::Store(
                err @ (StoreError::RefreshTokenNotFound | StoreError::RefreshTokenExpired),
            ) => ApiError::Unauthorized(err.to_string()),
            other => other,
        })?;

    Ok(Json(RefreshResponse { token }))
}

/// POST /api/revoke: forget the bearer refresh token.
pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh = bearer_token(&headers)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?
        .to_string();

    with_db(&state, move |db| db.revoke_refresh_token(&refresh)).await?;
    Ok(StatusCode::NO_CONTENT)
}
