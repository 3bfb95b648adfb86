use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::Identity;
use crate::types::UserId;

/// Body for `POST /auth/sign-up`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Body for `POST /auth/sign-in`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// The signed-in user, as returned next to the token pair. Deliberately
/// smaller than the profile view.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    #[schema(value_type = Uuid)]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<Identity> for UserSummary {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            first_name: identity.first_name,
            last_name: identity.last_name,
            avatar_url: identity.avatar_url,
        }
    }
}

/// Response for `POST /auth/sign-in`: the user plus a fresh token pair.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignInResponse {
    pub user: UserSummary,
    pub access_token: String,
    pub refresh_token: String,
}

/// Response for `POST /auth/refresh`. Only the access token is renewed;
/// the refresh token keeps its original lifetime.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
}
