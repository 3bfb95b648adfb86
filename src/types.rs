//! Common type definitions.
//!
//! All entity IDs are UUIDs wrapped in type aliases for better type safety:
//!
//! - [`UserId`]: Identity (user account) identifier
//! - [`RoleId`]: Role identifier
//! - [`CompanyId`]: Company identifier

use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type RoleId = Uuid;
pub type CompanyId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbrev_uuid() {
        let uuid: Uuid = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert_eq!(abbrev_uuid(&uuid), "550e8400");
    }
}
