//! Self-contained file access tokens for the local backend.
//!
//! A token is an HS256 JWT carrying the resolved file path and an expiry. The
//! backend keeps no token store; anything that verifies against the secret and
//! has not expired is honoured.

use crate::{StorageError, StorageResult};
use chrono::Utc;
use imgvault_utils::normalize_path;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Claims embedded in a file access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileClaims {
    /// Absolute path of the stored file
    pub path: String,
    /// Expiry as a unix timestamp in seconds
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        // Expiry is checked against our own clock in verify_at, without leeway
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Mints a token for `path` valid for `expires_in_secs` from now
    pub fn sign(&self, path: &Path, expires_in_secs: u64) -> StorageResult<String> {
        let expires_in = i64::try_from(expires_in_secs).unwrap_or(i64::MAX);
        let claims = FileClaims {
            path: normalize_path(path),
            exp: Utc::now().timestamp().saturating_add(expires_in),
        };
        self.sign_claims(&claims)
    }

    pub fn sign_claims(&self, claims: &FileClaims) -> StorageResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| StorageError::Backend(format!("failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> StorageResult<FileClaims> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verifies signature and expiry as of `now` (unix seconds).
    ///
    /// A token is valid only while `exp > now`.
    pub fn verify_at(&self, token: &str, now: i64) -> StorageResult<FileClaims> {
        let claims = decode::<FileClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected file token");
                StorageError::InvalidToken
            })?;

        if claims.exp <= now {
            tracing::debug!(exp = claims.exp, now, "Rejected expired file token");
            return Err(StorageError::InvalidToken);
        }

        Ok(claims)
    }
}
