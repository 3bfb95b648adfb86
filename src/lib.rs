//! # firmdesk: multi-tenant company management backend
//!
//! `firmdesk` is the REST backend for a platform where users register
//! companies and operators oversee the platform through role-scoped
//! dashboards. It provides stateless JWT authentication (short-lived access
//! tokens plus long-lived refresh tokens, each signed with its own secret),
//! Argon2id credential storage, and role-based access control with three
//! built-in roles: `user`, `admin` and `superadmin`.
//!
//! ## Request flow
//!
//! Public routes (`/auth/*`, `/healthz`) are open. Everything else sits
//! behind two middleware layers: [`auth::middleware::require_auth`] verifies
//! the bearer access token and stashes its claims in request extensions, and
//! [`auth::middleware::authorize_roles`] resolves the claims' role id through
//! the store and checks it against the route's allowed set. Handlers read the
//! verified claims through the [`auth::current_user::AuthClaims`] extractor.
//!
//! Persistence goes through the [`store::AuthStore`] trait; production uses
//! [`store::postgres::PgAuthStore`] over a PostgreSQL pool, tests use
//! [`store::memory::MemoryStore`].
//!
//! ## Quick start
//!
//! ```no_run
//! use clap::Parser;
//! use firmdesk::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = firmdesk::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     firmdesk::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
mod openapi;
pub mod store;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test;
#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    auth::middleware::{authorize_roles, require_auth},
    auth::password::{Argon2Params, hash_password_with_params},
    openapi::ApiDoc,
    store::{AuthStore, IdentityCreateRequest, RoleName},
};

pub use config::Config;
pub use types::{CompanyId, RoleId, UserId};

const USER_ONLY: &[RoleName] = &[RoleName::User];
const ADMIN_UP: &[RoleName] = &[RoleName::Admin, RoleName::Superadmin];
const SUPERADMIN_ONLY: &[RoleName] = &[RoleName::Superadmin];
const ALL_ROLES: &[RoleName] = &[RoleName::User, RoleName::Admin, RoleName::Superadmin];

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AuthStore>,
    pub config: Arc<Config>,
}

/// Get the firmdesk database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial superadmin account if it doesn't exist.
///
/// Idempotent: an existing account under the configured email is left
/// untouched. Called during startup so a fresh deployment always has an
/// operator login.
#[instrument(skip_all)]
pub async fn create_initial_superadmin(store: &Arc<dyn AuthStore>, config: &Config) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&config.superadmin_email, &config.superadmin_password) else {
        warn!("superadmin_email/superadmin_password not configured, skipping superadmin creation");
        return Ok(());
    };

    if store.find_credential_by_email(email).await?.is_some() {
        return Ok(());
    }

    let role = store
        .find_role_by_name(RoleName::Superadmin)
        .await?
        .ok_or_else(|| anyhow::anyhow!("superadmin role missing, migrations did not run"))?;

    let params = Argon2Params::from(&config.auth.password);
    let password = password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password_with_params(&password, Some(params)))
        .await?
        .map_err(|e| anyhow::anyhow!("hash superadmin password: {e}"))?;

    store
        .create_identity(&IdentityCreateRequest {
            first_name: "Super".to_string(),
            last_name: "Admin".to_string(),
            email: email.clone(),
            password_hash,
            role_id: role.id,
        })
        .await?;

    info!("Created initial superadmin account");
    Ok(())
}

/// Build the application router with all endpoints and middleware.
///
/// Role restrictions are attached per route group with `route_layer`, and the
/// authentication layer is applied to the assembled protected router
/// afterwards so it always runs first.
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/sign-up", post(api::handlers::auth::sign_up))
        .route("/auth/sign-in", post(api::handlers::auth::sign_in))
        .route("/auth/refresh", post(api::handlers::auth::refresh));

    let profile_routes = Router::new()
        .route(
            "/profile",
            get(api::handlers::profile::get_profile).put(api::handlers::profile::update_profile),
        )
        .route("/profile/password", put(api::handlers::profile::change_password))
        .route_layer(from_fn_with_state((state.clone(), ALL_ROLES), authorize_roles));

    let user_dashboard = Router::new()
        .route("/dashboard/user", get(api::handlers::dashboard::user_dashboard))
        .route_layer(from_fn_with_state((state.clone(), USER_ONLY), authorize_roles));

    let admin_dashboard = Router::new()
        .route("/dashboard/admin", get(api::handlers::dashboard::admin_dashboard))
        .route_layer(from_fn_with_state((state.clone(), ADMIN_UP), authorize_roles));

    let superadmin_dashboard = Router::new()
        .route("/dashboard/superadmin", get(api::handlers::dashboard::superadmin_dashboard))
        .route_layer(from_fn_with_state((state.clone(), SUPERADMIN_ONLY), authorize_roles));

    let protected_routes = profile_routes
        .merge(user_dashboard)
        .merge(admin_dashboard)
        .merge(superadmin_dashboard)
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .merge(auth_routes)
        .merge(protected_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        )
}

/// Main application struct that owns all resources and lifecycle.
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance: connect to the database, run
    /// migrations, seed the superadmin and build the router.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("database_url is not configured"))?;

        let pool = PgPool::connect(database_url).await?;
        migrator().run(&pool).await?;

        let store: Arc<dyn AuthStore> = Arc::new(store::postgres::PgAuthStore::new(pool.clone()));
        create_initial_superadmin(&store, &config).await?;

        let state = AppState {
            store,
            config: Arc::new(config.clone()),
        };
        let router = build_router(state);

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("firmdesk listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
