use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{AppState, bearer_token};
use crate::error::ApiError;

/// ID of the user who signed the request's access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub u64);

/// Extract and validate the access token from the Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id = {
        let token = bearer_token(req.headers())
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;
        state.db.parse_user_id(token)?
    };

    req.extensions_mut().insert(AuthUser(user_id));
    Ok(next.run(req).await)
}
