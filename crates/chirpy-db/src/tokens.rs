use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::{OsRng, RngCore};
use tracing::debug;

use chirpy_types::api::AccessClaims;

use crate::error::{Result, StoreError};
use crate::models::RefreshToken;
use crate::Database;

pub const DEFAULT_ISSUER: &str = "chirpy";
const REFRESH_TOKEN_BYTES: usize = 32;

/// Signing settings for access tokens and lifetimes for both token kinds.
/// Built once at startup; never re-read from the environment.
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub issuer: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    /// HS256 with `secret`, issuer `chirpy`, 1 hour access tokens and 60 day
    /// refresh tokens.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: DEFAULT_ISSUER.to_string(),
            access_ttl: Duration::hours(1),
            refresh_ttl: Duration::days(60),
        }
    }

    pub fn sign_access_token(&self, user_id: u64, now: DateTime<Utc>) -> Result<String> {
        let claims = AccessClaims {
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.access_ttl).timestamp() as usize,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Check signature, expiry and issuer, then read the user ID from `sub`.
    pub fn verify_access_token(&self, token: &str) -> Result<u64> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        let data = decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;

        let sub = data.claims.sub;
        sub.parse().map_err(|_| StoreError::MalformedSubject(sub))
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl Database {
    /// Store a fresh random refresh token for `user_id` and return it.
    ///
    /// Earlier tokens for the same user stay valid.
    pub fn issue_refresh_token(&self, user_id: u64) -> Result<String> {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        let expires_at = Utc::now() + self.token_config().refresh_ttl;
        self.with_snapshot_mut(|snap| {
            snap.refresh_tokens.insert(
                token.clone(),
                RefreshToken {
                    token: token.clone(),
                    user_id,
                    expires_at,
                },
            );
            Ok(())
        })?;

        debug!("Issued refresh token for user {}", user_id);
        Ok(token)
    }

    /// Exchange a live refresh token for a signed access token.
    pub fn mint_access_token(&self, refresh_token: &str) -> Result<String> {
        let record = self
            .snapshot()?
            .refresh_tokens
            .remove(refresh_token)
            .ok_or(StoreError::RefreshTokenNotFound)?;

        let now = Utc::now();
        if now > record.expires_at {
            return Err(StoreError::RefreshTokenExpired);
        }

        self.token_config().sign_access_token(record.user_id, now)
    }

    /// Delete a refresh token. Unknown tokens are not an error.
    pub fn revoke_refresh_token(&self, refresh_token: &str) -> Result<()> {
        let removed = self.with_snapshot_mut(|snap| Ok(snap.refresh_tokens.remove(refresh_token)))?;
        if let Some(record) = removed {
            debug!("Revoked refresh token for user {}", record.user_id);
        }
        Ok(())
    }

    pub fn parse_user_id(&self, access_token: &str) -> Result<u64> {
        self.token_config().verify_access_token(access_token)
    }
}
