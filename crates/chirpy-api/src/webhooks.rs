use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use tracing::debug;

use chirpy_types::api::{USER_UPGRADED_EVENT, WebhookRequest};

use crate::auth::{AppState, with_db};
use crate::error::ApiError;

fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("ApiKey "))
}

/// POST /api/polka/webhooks: billing events. Only `user.upgraded` does
/// anything; other events are acknowledged and ignored.
pub async fn polka(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<WebhookRequest>,
) -> Result<impl IntoResponse, ApiError> {
    match api_key(&headers) {
        Some(key) if !state.polka_key.is_empty() && key == state.polka_key => {}
        _ => return Err(ApiError::Unauthorized("invalid API key".into())),
    }

    if req.event != USER_UPGRADED_EVENT {
        debug!("Ignoring webhook event {}", req.event);
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = req.data.user_id;
    with_db(&state, move |db| db.set_chirpy_red(user_id, true)).await?;
    Ok(StatusCode::NO_CONTENT)
}
