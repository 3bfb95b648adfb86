//! End-to-end tests over the full router with an in-memory store.

use serde_json::json;

use crate::{
    api::models::auth::{RefreshResponse, SignInResponse},
    auth::token::{issue_access_token, verify_token},
    store::RoleName,
    test_utils::{create_identity, test_config, test_server, test_state, test_state_with_config},
};

async fn sign_in(server: &axum_test::TestServer, email: &str, password: &str) -> axum_test::TestResponse {
    server
        .post("/auth/sign-in")
        .json(&json!({ "email": email, "password": password }))
        .await
}

async fn tokens_for(server: &axum_test::TestServer, email: &str, password: &str) -> SignInResponse {
    let response = sign_in(server, email, password).await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn test_healthz() {
    let (state, _) = test_state();
    let server = test_server(state);

    let response = server.get("/healthz").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn test_sign_up_creates_usable_account() {
    let (state, _) = test_state();
    let server = test_server(state);

    let response = server
        .post("/auth/sign-up")
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "password": "analytical engine"
        }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "User created successfully");

    // The fresh credentials work for sign-in and land in the base role
    let signed_in = tokens_for(&server, "ada@example.com", "analytical engine").await;
    assert_eq!(signed_in.user.first_name, "Ada");
    server
        .get("/dashboard/user")
        .add_header("authorization", format!("Bearer {}", signed_in.access_token))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_sign_up_rejects_missing_fields() {
    let (state, _) = test_state();
    let server = test_server(state);

    let response = server
        .post("/auth/sign-up")
        .json(&json!({
            "first_name": "",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "password": "analytical engine"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "All fields are required");
}

#[tokio::test]
async fn test_sign_up_rejects_short_password() {
    let (state, _) = test_state();
    let server = test_server(state);

    let response = server
        .post("/auth/sign-up")
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "ada@example.com",
            "password": "short"
        }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_up_duplicate_email_conflicts() {
    let (state, store) = test_state();
    let server = test_server(state);
    create_identity(&store, "ada@example.com", "password123", RoleName::User).await;

    let response = server
        .post("/auth/sign-up")
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Again",
            "email": "ada@example.com",
            "password": "password123"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "An account with this email address already exists");
}

#[tokio::test]
async fn test_sign_in_returns_user_and_decodable_tokens() {
    let (state, store) = test_state();
    let server = test_server(state);
    let identity = create_identity(&store, "ada@example.com", "password123", RoleName::User).await;

    let signed_in = tokens_for(&server, "ada@example.com", "password123").await;
    assert_eq!(signed_in.user.id, identity.id);

    // Both tokens verify under their own secret and agree on the subject
    let access = verify_token(&signed_in.access_token, "test-access-secret").unwrap();
    let refresh = verify_token(&signed_in.refresh_token, "test-refresh-secret").unwrap();
    assert_eq!(access.sub, identity.id);
    assert_eq!(refresh.sub, identity.id);
    assert_eq!(access.role_id, identity.role_id);
}

#[tokio::test]
async fn test_sign_in_failure_messages() {
    let (state, store) = test_state();
    let server = test_server(state);
    create_identity(&store, "ada@example.com", "password123", RoleName::User).await;

    let response = sign_in(&server, "nobody@example.com", "password123").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Email not found");

    let response = sign_in(&server, "ada@example.com", "wrong").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Incorrect password");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let (state, _) = test_state();
    let server = test_server(state);

    let response = server.get("/profile").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "User not authorized");
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let (state, _) = test_state();
    let server = test_server(state);

    let response = server
        .get("/profile")
        .add_header("authorization", "Bearer not.a.token")
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Access token outdated");
}

#[tokio::test]
async fn test_expired_access_token_rejected() {
    let mut config = test_config();
    config.auth.access_token_ttl = std::time::Duration::ZERO;
    let (state, store) = test_state_with_config(config);
    let server = test_server(state);
    create_identity(&store, "ada@example.com", "password123", RoleName::User).await;

    let signed_in = tokens_for(&server, "ada@example.com", "password123").await;

    // Zero lifetime: the token is already at its expiry instant
    let response = server
        .get("/profile")
        .add_header("authorization", format!("Bearer {}", signed_in.access_token))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_not_accepted_as_access_token() {
    let (state, store) = test_state();
    let server = test_server(state);
    create_identity(&store, "ada@example.com", "password123", RoleName::User).await;

    let signed_in = tokens_for(&server, "ada@example.com", "password123").await;

    let response = server
        .get("/profile")
        .add_header("authorization", format!("Bearer {}", signed_in.refresh_token))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_authorizer_enforces_route_sets() {
    let (state, store) = test_state();
    let server = test_server(state);
    create_identity(&store, "user@example.com", "password123", RoleName::User).await;
    create_identity(&store, "admin@example.com", "password123", RoleName::Admin).await;
    create_identity(&store, "root@example.com", "password123", RoleName::Superadmin).await;

    let user = tokens_for(&server, "user@example.com", "password123").await;
    let admin = tokens_for(&server, "admin@example.com", "password123").await;
    let root = tokens_for(&server, "root@example.com", "password123").await;

    let get = |path: &str, token: &str| {
        server
            .get(path)
            .add_header("authorization", format!("Bearer {token}"))
    };

    // The user dashboard is for the base role only
    get("/dashboard/user", &user.access_token).await.assert_status_ok();
    get("/dashboard/user", &admin.access_token)
        .await
        .assert_status(axum::http::StatusCode::FORBIDDEN);

    // Admin routes admit both operator roles
    get("/dashboard/admin", &admin.access_token).await.assert_status_ok();
    get("/dashboard/admin", &root.access_token).await.assert_status_ok();
    let response = get("/dashboard/admin", &user.access_token).await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Forbidden: access denied");

    // Superadmin routes are exclusive
    get("/dashboard/superadmin", &root.access_token).await.assert_status_ok();
    get("/dashboard/superadmin", &admin.access_token)
        .await
        .assert_status(axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_role_id_is_forbidden() {
    let (state, _) = test_state();
    let server = test_server(state.clone());

    // Validly signed token whose role id matches nothing in the store
    let token = issue_access_token(uuid::Uuid::new_v4(), uuid::Uuid::new_v4(), &state.config.auth).unwrap();

    let response = server
        .get("/dashboard/user")
        .add_header("authorization", format!("Bearer {token}"))
        .await;
    response.assert_status(axum::http::StatusCode::FORBIDDEN);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Forbidden: access denied");
}

#[tokio::test]
async fn test_user_dashboard_reports_owned_companies() {
    let (state, store) = test_state();
    let server = test_server(state);
    let owner = create_identity(&store, "owner@example.com", "password123", RoleName::User).await;
    let other = create_identity(&store, "other@example.com", "password123", RoleName::User).await;
    store.add_company(owner.id, 5000);
    store.add_company(owner.id, 1500);
    store.add_company(other.id, 99);

    let signed_in = tokens_for(&server, "owner@example.com", "password123").await;
    let response = server
        .get("/dashboard/user")
        .add_header("authorization", format!("Bearer {}", signed_in.access_token))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["companies_owned"], 2);
    assert_eq!(body["total_capital"], 6500);
}

#[tokio::test]
async fn test_refresh_issues_new_access_token() {
    let (state, store) = test_state();
    let server = test_server(state);
    let identity = create_identity(&store, "ada@example.com", "password123", RoleName::User).await;

    let signed_in = tokens_for(&server, "ada@example.com", "password123").await;

    let response = server
        .post("/auth/refresh")
        .add_header("authorization", format!("Bearer {}", signed_in.refresh_token))
        .await;
    response.assert_status_ok();

    let renewed: RefreshResponse = response.json();
    let claims = verify_token(&renewed.access_token, "test-access-secret").unwrap();
    assert_eq!(claims.sub, identity.id);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let (state, store) = test_state();
    let server = test_server(state);
    create_identity(&store, "ada@example.com", "password123", RoleName::User).await;

    let signed_in = tokens_for(&server, "ada@example.com", "password123").await;

    // Signed with the wrong secret for this endpoint
    let response = server
        .post("/auth/refresh")
        .add_header("authorization", format!("Bearer {}", signed_in.access_token))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Verification error");
}

#[tokio::test]
async fn test_expired_refresh_token_rejected() {
    let mut config = test_config();
    config.auth.refresh_token_ttl = std::time::Duration::ZERO;
    let (state, store) = test_state_with_config(config);
    let server = test_server(state);
    create_identity(&store, "ada@example.com", "password123", RoleName::User).await;

    let signed_in = tokens_for(&server, "ada@example.com", "password123").await;

    let response = server
        .post("/auth/refresh")
        .add_header("authorization", format!("Bearer {}", signed_in.refresh_token))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Verification error");
}

#[tokio::test]
async fn test_missing_refresh_token_rejected() {
    let (state, _) = test_state();
    let server = test_server(state);

    let response = server.post("/auth/refresh").await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Verification error");
}

#[tokio::test]
async fn test_profile_read_and_update() {
    let (state, store) = test_state();
    let server = test_server(state);
    let identity = create_identity(&store, "ada@example.com", "password123", RoleName::User).await;

    let signed_in = tokens_for(&server, "ada@example.com", "password123").await;
    let auth = format!("Bearer {}", signed_in.access_token);

    let response = server.get("/profile").add_header("authorization", auth.clone()).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], identity.id.to_string());
    assert_eq!(body["email"], "ada@example.com");
    assert!(body.get("password_hash").is_none());

    let response = server
        .put("/profile")
        .add_header("authorization", auth.clone())
        .json(&json!({ "first_name": "Ada", "last_name": "King" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(body["last_name"], "King");
}

#[tokio::test]
async fn test_change_password_flow() {
    let (state, store) = test_state();
    let server = test_server(state);
    create_identity(&store, "ada@example.com", "old password", RoleName::User).await;

    let signed_in = tokens_for(&server, "ada@example.com", "old password").await;
    let auth = format!("Bearer {}", signed_in.access_token);

    // Wrong current password is rejected
    let response = server
        .put("/profile/password")
        .add_header("authorization", auth.clone())
        .json(&json!({ "current_password": "not it", "new_password": "new password" }))
        .await;
    response.assert_status(axum::http::StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Incorrect password");

    // Correct current password changes the credential
    let response = server
        .put("/profile/password")
        .add_header("authorization", auth)
        .json(&json!({ "current_password": "old password", "new_password": "new password" }))
        .await;
    response.assert_status_ok();

    sign_in(&server, "ada@example.com", "old password")
        .await
        .assert_status(axum::http::StatusCode::UNAUTHORIZED);
    sign_in(&server, "ada@example.com", "new password").await.assert_status_ok();
}
