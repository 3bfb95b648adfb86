use axum::{Json, extract::State, http::HeaderMap};

use crate::{
    AppState,
    api::models::auth::{RefreshResponse, SignInRequest, SignInResponse, SignUpRequest},
    auth::{
        credentials,
        middleware::bearer_token,
        password::{Argon2Params, hash_password_with_params},
        token::{issue_access_token, issue_refresh_token, verify_token},
    },
    config::PasswordConfig,
    errors::Error,
    store::{IdentityCreateRequest, RoleName},
};

/// Validate password length against the configured bounds.
pub(crate) fn validate_password(password: &str, config: &PasswordConfig) -> Result<(), Error> {
    if password.len() < config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", config.min_length),
        });
    }
    if password.len() > config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", config.max_length),
        });
    }
    Ok(())
}

/// Hash a password on the blocking pool with the configured argon2 cost.
pub(crate) async fn hash_on_blocking_pool(state: &AppState, password: String) -> Result<String, Error> {
    let params = Argon2Params::from(&state.config.auth.password);
    tokio::task::spawn_blocking(move || hash_password_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })?
}

/// Register a new account with the `user` role
#[utoipa::path(
    post,
    path = "/auth/sign-up",
    request_body = SignUpRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Account created"),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn sign_up(State(state): State<AppState>, Json(request): Json<SignUpRequest>) -> Result<Json<serde_json::Value>, Error> {
    if request.first_name.trim().is_empty()
        || request.last_name.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(Error::BadRequest {
            message: "All fields are required".to_string(),
        });
    }
    validate_password(&request.password, &state.config.auth.password)?;

    let password_hash = hash_on_blocking_pool(&state, request.password).await?;

    // Self-registration always lands in the base role
    let role = state
        .store
        .find_role_by_name(RoleName::User)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::Internal {
            operation: "resolve the base user role".to_string(),
        })?;

    state
        .store
        .create_identity(&IdentityCreateRequest {
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            password_hash,
            role_id: role.id,
        })
        .await
        .map_err(Error::from)?;

    Ok(Json(serde_json::json!({ "message": "User created successfully" })))
}

/// Exchange email/password credentials for a token pair
#[utoipa::path(
    post,
    path = "/auth/sign-in",
    request_body = SignInRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Authenticated", body = SignInResponse),
        (status = 401, description = "Unknown email or wrong password"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn sign_in(State(state): State<AppState>, Json(request): Json<SignInRequest>) -> Result<Json<SignInResponse>, Error> {
    let identity = credentials::authenticate(&state.store, &request.email, &request.password).await?;

    let access_token = issue_access_token(identity.id, identity.role_id, &state.config.auth)?;
    let refresh_token = issue_refresh_token(identity.id, identity.role_id, &state.config.auth)?;

    Ok(Json(SignInResponse {
        user: identity.into(),
        access_token,
        refresh_token,
    }))
}

/// Exchange a valid refresh token for a fresh access token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Missing, invalid or expired refresh token"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<RefreshResponse>, Error> {
    let verification_error = || Error::Unauthenticated {
        message: Some("Verification error".to_string()),
    };

    let token = bearer_token(&headers).ok_or_else(verification_error)?;
    let claims = verify_token(token, state.config.auth.refresh_secret()?).map_err(|_| verification_error())?;

    // Re-read the identity so the new access token reflects role changes made
    // since the refresh token was issued
    let identity = state
        .store
        .find_identity_by_id(claims.sub)
        .await
        .map_err(Error::from)?
        .ok_or_else(verification_error)?;

    let access_token = issue_access_token(identity.id, identity.role_id, &state.config.auth)?;
    Ok(Json(RefreshResponse { access_token }))
}
