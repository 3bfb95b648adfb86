use axum::{Json, extract::State};

use crate::{
    AppState,
    api::handlers::auth::{hash_on_blocking_pool, validate_password},
    api::models::users::{ChangePasswordRequest, UpdateProfileRequest, UserResponse},
    auth::{current_user::AuthClaims, password::verify_password},
    errors::Error,
};

/// Fetch the caller's own profile
#[utoipa::path(
    get,
    path = "/profile",
    tag = "profile",
    responses(
        (status = 200, description = "Current profile", body = UserResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Identity no longer exists"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_profile(State(state): State<AppState>, AuthClaims(claims): AuthClaims) -> Result<Json<UserResponse>, Error> {
    let identity = state
        .store
        .find_identity_by_id(claims.sub)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::NotFound {
            resource: "User".to_string(),
        })?;

    Ok(Json(identity.into()))
}

/// Update the caller's name
#[utoipa::path(
    put,
    path = "/profile",
    request_body = UpdateProfileRequest,
    tag = "profile",
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, Error> {
    if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "First and last name must not be empty".to_string(),
        });
    }

    let identity = state
        .store
        .update_profile(claims.sub, &request.first_name, &request.last_name)
        .await
        .map_err(Error::from)?;

    Ok(Json(identity.into()))
}

/// Change the caller's password
#[utoipa::path(
    put,
    path = "/profile/password",
    request_body = ChangePasswordRequest,
    tag = "profile",
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "New password fails validation"),
        (status = 401, description = "Current password incorrect"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn change_password(
    State(state): State<AppState>,
    AuthClaims(claims): AuthClaims,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, Error> {
    validate_password(&request.new_password, &state.config.auth.password)?;

    let identity = state
        .store
        .find_identity_by_id(claims.sub)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::NotFound {
            resource: "User".to_string(),
        })?;

    let credential = state
        .store
        .find_credential_by_email(&identity.email)
        .await
        .map_err(Error::from)?
        .ok_or_else(|| Error::NotFound {
            resource: "User".to_string(),
        })?;

    let current = request.current_password;
    let hash = credential.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&current, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })?;

    if !verified {
        return Err(Error::Unauthenticated {
            message: Some("Incorrect password".to_string()),
        });
    }

    let new_hash = hash_on_blocking_pool(&state, request.new_password).await?;
    state.store.update_password(claims.sub, &new_hash).await.map_err(Error::from)?;

    Ok(Json(serde_json::json!({ "message": "Password changed" })))
}
