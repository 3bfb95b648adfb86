//! Access and refresh token issuance and verification.
//!
//! Both token classes are HS256 JWTs carrying the same claim shape: the
//! identity id, the role id, and issued-at/expiry timestamps. They differ in
//! signing secret and lifetime. Tokens are stateless: validity is purely a
//! function of signature and expiry, and nothing is persisted server-side.
//!
//! Two calls with identical inputs at different instants produce different
//! tokens (the timestamps differ); tokens must never be compared for equality
//! as a substitute for claim comparison.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AuthConfig;
use crate::errors::Error;
use crate::types::{RoleId, UserId};

/// Claims embedded in both access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (identity id)
    pub sub: UserId,
    /// Role id; the authorizer resolves this to a role name per request
    pub role_id: RoleId,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration time (unix seconds)
    pub exp: i64,
}

/// Why a presented token was rejected.
///
/// The three reasons are distinguishable by the caller (for logging) but all
/// surface uniformly as an authentication failure, never a server error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The token could not be parsed at all
    #[error("malformed token")]
    Malformed,

    /// The signature does not match the expected secret
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token's expiry instant has been reached
    #[error("expired token")]
    Expired,
}

impl From<TokenError> for Error {
    fn from(err: TokenError) -> Self {
        tracing::debug!("token rejected: {err}");
        Error::Unauthenticated {
            message: Some("Access token outdated".to_string()),
        }
    }
}

fn issue(identity_id: UserId, role_id: RoleId, secret: &str, ttl_secs: i64) -> Result<String, Error> {
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        sub: identity_id,
        role_id,
        iat: now,
        exp: now + ttl_secs,
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("sign token: {e}"),
    })
}

/// Issue a short-lived access token.
pub fn issue_access_token(identity_id: UserId, role_id: RoleId, auth: &AuthConfig) -> Result<String, Error> {
    issue(identity_id, role_id, auth.access_secret()?, auth.access_token_ttl.as_secs() as i64)
}

/// Issue a long-lived refresh token, signed with its own secret.
pub fn issue_refresh_token(identity_id: UserId, role_id: RoleId, auth: &AuthConfig) -> Result<String, Error> {
    issue(identity_id, role_id, auth.refresh_secret()?, auth.refresh_token_ttl.as_secs() as i64)
}

/// Verify a token's signature against `secret`, then its expiry against the
/// current time, and extract its claims.
///
/// Expiry is checked explicitly rather than through the jsonwebtoken
/// validator so that the exact-expiry instant counts as expired: a token with
/// `exp == now` fails verification.
pub fn verify_token(token: &str, secret: &str) -> Result<TokenClaims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;

    let data = decode::<TokenClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        // Everything else that can arise from client input - garbage base64,
        // missing claims, wrong algorithm, truncated payload - is malformed.
        _ => TokenError::Malformed,
    })?;

    if data.claims.exp <= Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }

    Ok(data.claims)
}
