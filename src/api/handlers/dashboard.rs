use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::dashboard::{PlatformDashboard, UserDashboard},
    auth::current_user::AuthClaims,
    errors::Error,
};

/// Per-user dashboard: statistics over the caller's own companies
#[utoipa::path(
    get,
    path = "/dashboard/user",
    tag = "dashboard",
    responses(
        (status = 200, description = "User dashboard", body = UserDashboard),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Role not permitted"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn user_dashboard(State(state): State<AppState>, AuthClaims(claims): AuthClaims) -> Result<Json<UserDashboard>, Error> {
    let stats = state.store.user_stats(claims.sub).await.map_err(Error::from)?;
    Ok(Json(stats.into()))
}

/// Platform-wide dashboard for admins
#[utoipa::path(
    get,
    path = "/dashboard/admin",
    tag = "dashboard",
    responses(
        (status = 200, description = "Platform dashboard", body = PlatformDashboard),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Role not permitted"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn admin_dashboard(State(state): State<AppState>) -> Result<Json<PlatformDashboard>, Error> {
    let stats = state.store.platform_stats().await.map_err(Error::from)?;
    Ok(Json(stats.into()))
}

/// Platform-wide dashboard for superadmins
#[utoipa::path(
    get,
    path = "/dashboard/superadmin",
    tag = "dashboard",
    responses(
        (status = 200, description = "Platform dashboard", body = PlatformDashboard),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Role not permitted"),
    ),
    security(("bearer" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn superadmin_dashboard(State(state): State<AppState>) -> Result<Json<PlatformDashboard>, Error> {
    let stats = state.store.platform_stats().await.map_err(Error::from)?;
    Ok(Json(stats.into()))
}
