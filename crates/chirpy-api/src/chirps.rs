use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;

use chirpy_db::SortOrder;
use chirpy_types::api::{ChirpResponse, CreateChirpRequest};

use crate::auth::{AppState, with_db};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::profanity;

pub const MAX_CHIRP_LENGTH: usize = 140;

#[derive(Debug, Deserialize)]
pub struct ChirpQuery {
    /// Only chirps by this user. Missing, `0` or non-numeric means everyone.
    pub author_id: Option<String>,
    /// `desc` for newest first; anything else is ascending.
    pub sort: Option<String>,
}

impl ChirpQuery {
    fn author_filter(&self) -> Option<u64> {
        self.author_id
            .as_deref()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|id| *id != 0)
    }
}

pub async fn create_chirp(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<CreateChirpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ApiError::BadRequest("Chirp is too long".into()));
    }

    let body = profanity::clean(&req.body);
    let chirp = with_db(&state, move |db| db.create_chirp(&body, user_id)).await?;

    info!("User {} posted chirp {}", user_id, chirp.id);
    Ok((StatusCode::CREATED, Json(ChirpResponse::from(chirp))))
}

pub async fn get_chirps(
    State(state): State<AppState>,
    Query(query): Query<ChirpQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let author = query.author_filter();
    let sort = SortOrder::from_param(query.sort.as_deref());

    let chirps = with_db(&state, move |db| db.get_chirps(author, sort)).await?;

    let chirps: Vec<ChirpResponse> = chirps.into_iter().map(ChirpResponse::from).collect();
    Ok(Json(chirps))
}

pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let chirp = with_db(&state, move |db| db.get_chirp(chirp_id)).await?;
    Ok(Json(ChirpResponse::from(chirp)))
}

pub async fn delete_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<u64>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    with_db(&state, move |db| db.delete_chirp(user_id, chirp_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
