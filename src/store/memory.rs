//! In-memory [`AuthStore`] implementation.
//!
//! Backs the test suite so the auth chain can be exercised end to end without
//! a database. State lives behind a single `RwLock`; no operation holds the
//! lock across an await point.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    AuthStore, Credential, Identity, IdentityCreateRequest, PlatformStats, Result, Role, RoleName, StoreError, UserStats,
};
use crate::types::{RoleId, UserId};

#[derive(Debug, Clone)]
struct CompanyRecord {
    owner_id: UserId,
    capital: i64,
}

#[derive(Debug, Default)]
struct Inner {
    roles: Vec<Role>,
    identities: HashMap<UserId, Identity>,
    // identity id -> password hash; emails are unique across identities
    password_hashes: HashMap<UserId, String>,
    companies: Vec<CompanyRecord>,
}

/// In-memory store, pre-seeded with the three built-in roles.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create a store with the `user`/`admin`/`superadmin` roles present.
    pub fn new() -> Self {
        let store = Self::default();
        {
            let mut inner = store.inner.write().expect("store lock poisoned");
            for name in [RoleName::User, RoleName::Admin, RoleName::Superadmin] {
                inner.roles.push(Role { id: Uuid::new_v4(), name });
            }
        }
        store
    }

    /// Look up a seeded role id by name. Panics if the role is absent, which
    /// only happens when a test constructed the store without seeding.
    pub fn role_id(&self, name: RoleName) -> RoleId {
        let inner = self.inner.read().expect("store lock poisoned");
        inner
            .roles
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.id)
            .expect("role not seeded")
    }

    /// Register a company owned by `owner_id` (test fixture for dashboards).
    pub fn add_company(&self, owner_id: UserId, capital: i64) {
        let mut inner = self.inner.write().expect("store lock poisoned");
        inner.companies.push(CompanyRecord { owner_id, capital });
    }
}

#[async_trait]
impl AuthStore for MemoryStore {
    async fn find_credential_by_email(&self, email: &str) -> Result<Option<Credential>> {
        let inner = self.inner.read().expect("store lock poisoned");
        let identity = inner.identities.values().find(|i| i.email == email);
        Ok(identity.map(|identity| Credential {
            identity_id: identity.id,
            email: identity.email.clone(),
            password_hash: inner
                .password_hashes
                .get(&identity.id)
                .cloned()
                .unwrap_or_default(),
        }))
    }

    async fn find_identity_by_id(&self, id: UserId) -> Result<Option<Identity>> {
        let inner = self.inner.read().expect("store lock poisoned");
        Ok(inner.identities.get(&id).cloned())
    }

    async fn find_role_by_id(&self, id: RoleId) -> Result<Option<Role>> {
        let inner = self.inner.read().expect("store lock poisoned");
        Ok(inner.roles.iter().find(|r| r.id == id).cloned())
    }

    async fn find_role_by_name(&self, name: RoleName) -> Result<Option<Role>> {
        let inner = self.inner.read().expect("store lock poisoned");
        Ok(inner.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn create_identity(&self, request: &IdentityCreateRequest) -> Result<Identity> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if inner.identities.values().any(|i| i.email == request.email) {
            return Err(StoreError::UniqueViolation {
                field: "email".to_string(),
            });
        }

        let identity = Identity {
            id: Uuid::new_v4(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            email: request.email.clone(),
            role_id: request.role_id,
            avatar_url: None,
        };
        inner.password_hashes.insert(identity.id, request.password_hash.clone());
        inner.identities.insert(identity.id, identity.clone());
        Ok(identity)
    }

    async fn update_profile(&self, id: UserId, first_name: &str, last_name: &str) -> Result<Identity> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let identity = inner
            .identities
            .get_mut(&id)
            .ok_or_else(|| StoreError::Other(anyhow::anyhow!("identity {id} not found")))?;
        identity.first_name = first_name.to_string();
        identity.last_name = last_name.to_string();
        Ok(identity.clone())
    }

    async fn update_password(&self, id: UserId, new_hash: &str) -> Result<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        if !inner.identities.contains_key(&id) {
            return Err(StoreError::Other(anyhow::anyhow!("identity {id} not found")));
        }
        inner.password_hashes.insert(id, new_hash.to_string());
        Ok(())
    }

    async fn user_stats(&self, owner_id: UserId) -> Result<UserStats> {
        let inner = self.inner.read().expect("store lock poisoned");
        let owned: Vec<_> = inner.companies.iter().filter(|c| c.owner_id == owner_id).collect();
        Ok(UserStats {
            companies_owned: owned.len() as i64,
            total_capital: owned.iter().map(|c| c.capital).sum(),
        })
    }

    async fn platform_stats(&self) -> Result<PlatformStats> {
        let inner = self.inner.read().expect("store lock poisoned");
        let admin_role = inner.roles.iter().find(|r| r.name == RoleName::Admin).map(|r| r.id);
        Ok(PlatformStats {
            total_users: inner.identities.len() as i64,
            total_companies: inner.companies.len() as i64,
            total_admins: inner
                .identities
                .values()
                .filter(|i| Some(i.role_id) == admin_role)
                .count() as i64,
        })
    }
}
