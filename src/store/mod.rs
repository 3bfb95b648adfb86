//! Persistence layer for identities, credentials, roles and company statistics.
//!
//! All data access goes through the [`AuthStore`] trait so that the auth core
//! does not care where records live. Two implementations are provided:
//!
//! - [`postgres::PgAuthStore`]: PostgreSQL-backed store used in production
//! - [`memory::MemoryStore`]: in-memory store used by tests
//!
//! Password hashes cross this boundary only as part of a [`Credential`]; they
//! are consumed by the credential authenticator and never serialized into API
//! responses.

pub mod memory;
pub mod postgres;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::types::{RoleId, UserId};

/// Closed set of role names recognized by the authorization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    User,
    Admin,
    Superadmin,
}

impl RoleName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::User => "user",
            RoleName::Admin => "admin",
            RoleName::Superadmin => "superadmin",
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = UnknownRole;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "user" => Ok(RoleName::User),
            "admin" => Ok(RoleName::Admin),
            "superadmin" => Ok(RoleName::Superadmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Raised when a stored role name is outside the closed [`RoleName`] set.
#[derive(Debug, Error)]
#[error("unknown role name: {0}")]
pub struct UnknownRole(pub String);

/// A role record. Identities reference roles by id, so translating between
/// the id carried in token claims and the name checked by the authorizer
/// requires a store lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
}

/// An authenticated principal as stored.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role_id: RoleId,
    pub avatar_url: Option<String>,
}

/// The secret material for one identity: the unique email plus the salted
/// password hash. Only the credential authenticator looks at `password_hash`.
#[derive(Clone)]
pub struct Credential {
    pub identity_id: UserId,
    pub email: String,
    pub password_hash: String,
}

// Keep hashes out of debug output.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("identity_id", &self.identity_id)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Request to create a new identity (sign-up or seeding).
#[derive(Debug, Clone)]
pub struct IdentityCreateRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: RoleId,
}

/// Per-user dashboard statistics (companies the user owns).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserStats {
    pub companies_owned: i64,
    pub total_capital: i64,
}

/// Platform-wide dashboard statistics for admin/superadmin views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_companies: i64,
    pub total_admins: i64,
}

/// Unified error type for store operations that application code can handle.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique constraint violation (duplicate email, duplicate role name)
    #[error("Unique constraint violation on {field}")]
    UniqueViolation { field: String },

    /// A stored role name fell outside the closed role set
    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),

    /// Catch-all for non-recoverable errors (connection loss, protocol errors)
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Type alias for store operation results
pub type Result<T> = std::result::Result<T, StoreError>;

/// Abstract persistence interface consumed by the auth subsystem and the
/// thin REST surface around it.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Exact, case-sensitive email match.
    async fn find_credential_by_email(&self, email: &str) -> Result<Option<Credential>>;

    async fn find_identity_by_id(&self, id: UserId) -> Result<Option<Identity>>;

    async fn find_role_by_id(&self, id: RoleId) -> Result<Option<Role>>;

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>>;

    async fn create_identity(&self, request: &IdentityCreateRequest) -> Result<Identity>;

    async fn update_profile(&self, id: UserId, first_name: &str, last_name: &str) -> Result<Identity>;

    /// Replace the stored password hash. The plaintext never reaches the store.
    async fn update_password(&self, id: UserId, new_hash: &str) -> Result<()>;

    async fn user_stats(&self, owner_id: UserId) -> Result<UserStats>;

    async fn platform_stats(&self) -> Result<PlatformStats>;
}
