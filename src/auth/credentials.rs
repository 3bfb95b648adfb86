//! Email/password credential authentication.
//!
//! Sign-in is a two-step check with distinct failure messages: first the
//! email is resolved to a stored credential, then the presented password is
//! verified against the stored hash. Both failures map to 401 but tell the
//! caller which step failed.

use std::sync::Arc;

use thiserror::Error;

use crate::auth::password::verify_password;
use crate::errors::Error;
use crate::store::{AuthStore, Identity, StoreError};

/// Why a sign-in attempt was rejected.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No credential is stored under the presented email
    #[error("Email not found")]
    EmailNotFound,

    /// The email resolved but the password did not verify
    #[error("Incorrect password")]
    IncorrectPassword,

    /// The store failed before the credential could be checked
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CredentialError> for Error {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::EmailNotFound | CredentialError::IncorrectPassword => Error::Unauthenticated {
                message: Some(err.to_string()),
            },
            CredentialError::Store(store_err) => Error::Store(store_err),
        }
    }
}

/// Authenticate an email/password pair and return the matching identity.
///
/// The email lookup is exact and case-sensitive. Password verification runs
/// on the blocking pool; argon2 is deliberately expensive and must not stall
/// the async runtime.
pub async fn authenticate(
    store: &Arc<dyn AuthStore>,
    email: &str,
    password: &str,
) -> Result<Identity, CredentialError> {
    let credential = store
        .find_credential_by_email(email)
        .await?
        .ok_or(CredentialError::EmailNotFound)?;

    let password = password.to_string();
    let hash = credential.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| StoreError::Other(anyhow::anyhow!("password verification task failed: {e}")))?;

    if !verified {
        return Err(CredentialError::IncorrectPassword);
    }

    store
        .find_identity_by_id(credential.identity_id)
        .await?
        .ok_or(CredentialError::EmailNotFound)
}
