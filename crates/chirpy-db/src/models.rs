//! Persisted record types. These map directly to the snapshot document and
//! are distinct from chirpy-types API views so the hash never leaks.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chirpy_types::api::{ChirpResponse, UserResponse};

/// The whole database. Loaded and saved as one document.
///
/// Tables are ordered maps so the serialized form is deterministic and
/// `save(load())` leaves the file byte-for-byte unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub chirps: BTreeMap<u64, Chirp>,
    #[serde(default)]
    pub users: BTreeMap<u64, User>,
    #[serde(default)]
    pub refresh_tokens: BTreeMap<String, RefreshToken>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chirp {
    pub id: u64,
    pub body: String,
    pub author_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    /// Password hash, never the plaintext.
    pub password: String,
    #[serde(default)]
    pub is_chirpy_red: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: u64,
    pub expires_at: DateTime<Utc>,
}

/// Partial user update. `None` and empty strings leave the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only `"desc"` selects descending order; anything else is ascending.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }
}

/// Next ID for an integer-keyed table: highest existing key plus one, or 1.
///
/// Deleting the highest row frees its ID for reuse.
pub(crate) fn next_id<V>(table: &BTreeMap<u64, V>) -> u64 {
    table.keys().next_back().map_or(1, |max| max + 1)
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            body: chirp.body,
            author_id: chirp.author_id,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}
