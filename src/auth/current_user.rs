//! Handler-side access to the authenticated caller.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::token::TokenClaims;
use crate::errors::Error;

/// Extractor for the verified token claims of the current request.
///
/// The claims are placed into request extensions by the authentication
/// middleware. Using this extractor on a route that is not behind
/// [`require_auth`](crate::auth::middleware::require_auth) yields 401 rather
/// than a panic.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub TokenClaims);

impl<S> FromRequestParts<S> for AuthClaims
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TokenClaims>()
            .cloned()
            .map(AuthClaims)
            .ok_or(Error::Unauthenticated { message: None })
    }
}
