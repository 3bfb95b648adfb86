//! OpenAPI documentation for the REST API.
//!
//! Served interactively at `/docs`; the raw document is available at
//! `/api-docs/openapi.json`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Bearer access-token security scheme.
struct BearerSecurityAddon;

impl Modify for BearerSecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearer".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Access token authentication. Include the token in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_ACCESS_TOKEN\n```\n\n\
                            Obtain a token pair from `POST /auth/sign-in`; `POST /auth/refresh` takes \
                            the refresh token in the same header.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::sign_up,
        api::handlers::auth::sign_in,
        api::handlers::auth::refresh,
        api::handlers::profile::get_profile,
        api::handlers::profile::update_profile,
        api::handlers::profile::change_password,
        api::handlers::dashboard::user_dashboard,
        api::handlers::dashboard::admin_dashboard,
        api::handlers::dashboard::superadmin_dashboard,
    ),
    components(schemas(
        api::models::auth::SignUpRequest,
        api::models::auth::SignInRequest,
        api::models::auth::UserSummary,
        api::models::auth::SignInResponse,
        api::models::auth::RefreshResponse,
        api::models::users::UserResponse,
        api::models::users::UpdateProfileRequest,
        api::models::users::ChangePasswordRequest,
        api::models::dashboard::UserDashboard,
        api::models::dashboard::PlatformDashboard,
        crate::store::RoleName,
    )),
    modifiers(&BearerSecurityAddon),
    tags(
        (name = "auth", description = "Sign-up, sign-in and token refresh"),
        (name = "profile", description = "The caller's own account"),
        (name = "dashboard", description = "Role-scoped dashboards"),
    ),
    info(
        title = "firmdesk",
        description = "Multi-tenant backend for users, companies and role-scoped dashboards."
    )
)]
pub struct ApiDoc;
