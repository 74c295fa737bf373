use tracing::info;

use crate::error::{Result, StoreError};
use crate::models::{User, UserPatch, next_id};
use crate::Database;

impl Database {
    /// Store a new user. Email uniqueness is not checked here.
    pub fn create_user(&self, email: &str, password_hash: &str) -> Result<User> {
        self.with_snapshot_mut(|snap| {
            let user = User {
                id: next_id(&snap.users),
                email: email.to_string(),
                password: password_hash.to_string(),
                is_chirpy_red: false,
            };
            snap.users.insert(user.id, user.clone());
            Ok(user)
        })
    }

    pub fn get_user(&self, id: u64) -> Result<User> {
        self.snapshot()?
            .users
            .remove(&id)
            .ok_or(StoreError::UserNotFound)
    }

    /// Linear scan by email. With duplicates, the lowest ID wins.
    pub fn get_user_by_email(&self, email: &str) -> Result<User> {
        self.snapshot()?
            .users
            .into_values()
            .find(|u| u.email == email)
            .ok_or(StoreError::UserNotFound)
    }

    pub fn update_user(&self, id: u64, patch: UserPatch) -> Result<User> {
        self.with_snapshot_mut(|snap| {
            let user = snap.users.get_mut(&id).ok_or(StoreError::UserNotFound)?;
            if let Some(email) = patch.email.filter(|e| !e.is_empty()) {
                user.email = email;
            }
            if let Some(hash) = patch.password_hash.filter(|h| !h.is_empty()) {
                user.password = hash;
            }
            Ok(user.clone())
        })
    }

    /// Set the premium flag. Called by the billing webhook.
    pub fn set_chirpy_red(&self, id: u64, is_chirpy_red: bool) -> Result<()> {
        self.with_snapshot_mut(|snap| {
            let user = snap.users.get_mut(&id).ok_or(StoreError::UserNotFound)?;
            user.is_chirpy_red = is_chirpy_red;
            Ok(())
        })?;
        info!("User {} chirpy red set to {}", id, is_chirpy_red);
        Ok(())
    }
}
