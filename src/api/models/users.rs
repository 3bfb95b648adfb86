use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::Identity;
use crate::types::{RoleId, UserId};

/// Public view of an identity. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = Uuid)]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[schema(value_type = Uuid)]
    pub role_id: RoleId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<Identity> for UserResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            first_name: identity.first_name,
            last_name: identity.last_name,
            email: identity.email,
            role_id: identity.role_id,
            avatar_url: identity.avatar_url,
        }
    }
}

/// Body for `PUT /profile`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
}

/// Body for `PUT /profile/password`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}
