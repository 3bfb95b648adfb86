//! Request authentication and role authorization middleware.
//!
//! [`require_auth`] runs on every protected route: it demands a valid bearer
//! access token and stashes the verified [`TokenClaims`] in request
//! extensions for handlers and downstream middleware. [`authorize_roles`]
//! runs after it on role-restricted routes and resolves the claims' role id
//! against the store before admitting the request. A rejected request never
//! reaches its handler.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::{
    AppState,
    auth::token::{TokenClaims, verify_token},
    errors::Error,
    store::{RoleName, StoreError},
    types::abbrev_uuid,
};

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// Any other scheme, or a missing header, yields `None`; there is no cookie
/// fallback.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Middleware that rejects requests without a valid access token.
///
/// On success the verified claims are inserted into request extensions. All
/// failure shapes (missing header, malformed token, bad signature, expired)
/// collapse to 401; the response does not reveal which check failed.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, Error> {
    let token = bearer_token(request.headers()).ok_or(Error::Unauthenticated { message: None })?;

    let secret = state.config.auth.access_secret()?;
    let claims = verify_token(token, secret).map_err(Error::from)?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Middleware that restricts a route to a fixed set of role names.
///
/// Layered inside [`require_auth`], so verified claims are already present.
/// The role id from the claims is resolved to a name through the store on
/// every request; a stale or deleted role id is forbidden, not an error.
pub async fn authorize_roles(
    State((state, allowed)): State<(AppState, &'static [RoleName])>,
    request: Request,
    next: Next,
) -> Result<Response, Error> {
    let claims = request
        .extensions()
        .get::<TokenClaims>()
        .cloned()
        .ok_or(Error::Unauthenticated { message: None })?;

    // Role anomalies (deleted role id, out-of-set stored name) deny the
    // request rather than erroring
    let role = match state.store.find_role_by_id(claims.role_id).await {
        Ok(Some(role)) => role,
        Ok(None) => {
            warn!("role {} from token claims no longer exists", abbrev_uuid(&claims.role_id));
            return Err(Error::Forbidden);
        }
        Err(StoreError::UnknownRole(err)) => {
            warn!("role {} has a name outside the known set: {err}", abbrev_uuid(&claims.role_id));
            return Err(Error::Forbidden);
        }
        Err(err) => return Err(Error::from(err)),
    };

    if !allowed.contains(&role.name) {
        debug!("role {} not permitted here", role.name);
        return Err(Error::Forbidden);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_non_bearer_schemes_rejected() {
        assert_eq!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")), None);
        // Scheme comparison is exact
        assert_eq!(bearer_token(&headers_with("bearer abc.def.ghi")), None);
        assert_eq!(bearer_token(&headers_with("abc.def.ghi")), None);
    }
}
