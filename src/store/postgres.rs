//! PostgreSQL-backed [`AuthStore`] implementation.
//!
//! Queries are written with the runtime `query_as`/`query_scalar` API so the
//! crate builds without a live database. Role names are stored as text and
//! parsed back into the closed [`RoleName`] set on the way out; a row that
//! fails to parse is a data-integrity anomaly surfaced as
//! [`StoreError::UnknownRole`].

use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    AuthStore, Credential, Identity, IdentityCreateRequest, PlatformStats, Result, Role, RoleName, StoreError, UserStats,
};
use crate::types::{RoleId, UserId};

/// Store over a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: UserId,
    first_name: String,
    last_name: String,
    email: String,
    role_id: RoleId,
    avatar_url: Option<String>,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Identity {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role_id: row.role_id,
            avatar_url: row.avatar_url,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    id: RoleId,
    name: String,
}

impl TryFrom<RoleRow> for Role {
    type Error = StoreError;

    fn try_from(row: RoleRow) -> Result<Role> {
        Ok(Role {
            id: row.id,
            name: row.name.parse::<RoleName>()?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: UserId,
    email: String,
    password_hash: String,
}

fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = db_err
                .constraint()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return StoreError::UniqueViolation { field };
        }
    }
    StoreError::Other(anyhow::Error::from(err))
}

const IDENTITY_COLUMNS: &str = "id, first_name, last_name, email, role_id, avatar_url";

#[async_trait]
impl AuthStore for PgAuthStore {
    async fn find_credential_by_email(&self, email: &str) -> Result<Option<Credential>> {
        let row = sqlx::query_as::<_, CredentialRow>("SELECT id, email, password_hash FROM identities WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(|row| Credential {
            identity_id: row.id,
            email: row.email,
            password_hash: row.password_hash,
        }))
    }

    async fn find_identity_by_id(&self, id: UserId) -> Result<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!("SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(Identity::from))
    }

    async fn find_role_by_id(&self, id: RoleId) -> Result<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT id, name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(Role::try_from).transpose()
    }

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT id, name FROM roles WHERE name = $1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(Role::try_from).transpose()
    }

    async fn create_identity(&self, request: &IdentityCreateRequest) -> Result<Identity> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "INSERT INTO identities (first_name, last_name, email, password_hash, role_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {IDENTITY_COLUMNS}"
        ))
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(request.role_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_profile(&self, id: UserId, first_name: &str, last_name: &str) -> Result<Identity> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "UPDATE identities SET first_name = $2, last_name = $3 WHERE id = $1
             RETURNING {IDENTITY_COLUMNS}"
        ))
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_password(&self, id: UserId, new_hash: &str) -> Result<()> {
        sqlx::query("UPDATE identities SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(new_hash)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn user_stats(&self, owner_id: UserId) -> Result<UserStats> {
        let (companies_owned, total_capital): (i64, i64) =
            sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(capital), 0)::BIGINT FROM companies WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(UserStats {
            companies_owned,
            total_capital,
        })
    }

    async fn platform_stats(&self) -> Result<PlatformStats> {
        let (total_users, total_companies, total_admins): (i64, i64, i64) = sqlx::query_as(
            "SELECT
                 (SELECT COUNT(*) FROM identities),
                 (SELECT COUNT(*) FROM companies),
                 (SELECT COUNT(*) FROM identities i JOIN roles r ON i.role_id = r.id WHERE r.name = 'admin')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(PlatformStats {
            total_users,
            total_companies,
            total_admins,
        })
    }
}
