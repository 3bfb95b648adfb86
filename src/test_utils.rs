//! Shared fixtures for the test suite.

use std::sync::Arc;

use crate::{
    AppState, Config,
    auth::password::{Argon2Params, hash_password_with_params},
    config::AuthConfig,
    store::{AuthStore, Identity, IdentityCreateRequest, RoleName, memory::MemoryStore},
};

/// Cheap argon2 cost so tests don't burn seconds hashing.
pub fn fast_argon2() -> Argon2Params {
    Argon2Params {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

/// A valid config with test secrets and cheap password hashing.
pub fn test_config() -> Config {
    let mut config = Config {
        auth: AuthConfig {
            access_token_secret: Some("test-access-secret".to_string()),
            refresh_token_secret: Some("test-refresh-secret".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    config.auth.password.argon2_memory_kib = 1024;
    config.auth.password.argon2_iterations = 1;
    config.auth.password.argon2_parallelism = 1;
    config
}

/// App state over a freshly seeded in-memory store. The concrete store is
/// returned alongside so tests can reach its fixture helpers.
pub fn test_state() -> (AppState, Arc<MemoryStore>) {
    test_state_with_config(test_config())
}

pub fn test_state_with_config(config: Config) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        store: store.clone(),
        config: Arc::new(config),
    };
    (state, store)
}

/// Spin up a test server over the full router.
pub fn test_server(state: AppState) -> axum_test::TestServer {
    axum_test::TestServer::new(crate::build_router(state)).expect("Failed to create test server")
}

/// Create an identity with the given role and a password hashed at test cost.
pub async fn create_identity(store: &MemoryStore, email: &str, password: &str, role: RoleName) -> Identity {
    let request = IdentityCreateRequest {
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        password_hash: hash_password_with_params(password, Some(fast_argon2())).unwrap(),
        role_id: store.role_id(role),
    };
    store.create_identity(&request).await.expect("create test identity")
}
