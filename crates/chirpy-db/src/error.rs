//! Error types for the record store.
//!
//! Every failure is returned to the caller as a [`StoreError`]; the store
//! itself never swallows one. The HTTP layer decides the status code.

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot on disk is not well-formed JSON.
    #[error("malformed snapshot: {0}")]
    Format(#[from] serde_json::Error),

    /// The SQLite snapshot backend failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A previous holder of the store lock panicked.
    #[error("database lock poisoned")]
    LockPoisoned,

    #[error("chirp id out of range")]
    ChirpId,

    #[error("user not found")]
    UserNotFound,

    #[error("refresh token not found")]
    RefreshTokenNotFound,

    #[error("refresh token expired")]
    RefreshTokenExpired,

    /// The requester does not own the chirp (or it does not exist).
    #[error("user {user_id} may not delete chirp {chirp_id}")]
    Forbidden { user_id: u64, chirp_id: u64 },

    /// Bad signature, expired, wrong issuer or otherwise malformed JWT.
    #[error("invalid access token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("access token subject is not a user id: {0:?}")]
    MalformedSubject(String),
}

impl StoreError {
    /// True for the "entity or token absent" family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ChirpId | Self::UserNotFound | Self::RefreshTokenNotFound
        )
    }

    /// True for failures of the store itself rather than of the request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::Format(_) | Self::Sqlite(_) | Self::LockPoisoned
        )
    }
}
