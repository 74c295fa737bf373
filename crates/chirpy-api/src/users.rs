use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use chirpy_db::{StoreError, UserPatch};
use chirpy_types::api::{CreateUserRequest, UpdateUserRequest, UserResponse};

use crate::auth::{AppState, hash_password, with_db};
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// POST /api/users: sign up.
///
/// The "email taken" check and the insert are two separate store calls, so
/// two racing signups can still both succeed.
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("email and password are required".into()));
    }

    let email = req.email.clone();
    match with_db(&state, move |db| db.get_user_by_email(&email)).await {
        Ok(_) => return Err(ApiError::EmailTaken),
        Err(ApiError::Store(StoreError::UserNotFound)) => {}
        Err(e) => return Err(e),
    }

    let password_hash = hash_password(&req.password)?;
    let email = req.email;
    let user = with_db(&state, move |db| db.create_user(&email, &password_hash)).await?;

    info!("Registered user {}", user.id);
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// PUT /api/users: change the caller's email and/or password.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password_hash = match req.password.as_deref() {
        Some(pw) if !pw.is_empty() => Some(hash_password(pw)?),
        _ => None,
    };
    let patch = UserPatch {
        email: req.email,
        password_hash,
    };

    let user = with_db(&state, move |db| db.update_user(user_id, patch)).await?;
    Ok(Json(UserResponse::from(user)))
}
