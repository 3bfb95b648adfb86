//! Authentication and authorization core.
//!
//! - [`password`]: Argon2id hashing and fail-closed verification
//! - [`token`]: HS256 access/refresh token issuance and verification
//! - [`credentials`]: two-step email/password authentication
//! - [`middleware`]: request authentication and role authorization layers
//! - [`current_user`]: extractor for the verified claims of a request

pub mod credentials;
pub mod current_user;
pub mod middleware;
pub mod password;
pub mod token;
