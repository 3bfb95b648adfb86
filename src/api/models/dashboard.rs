use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::{PlatformStats, UserStats};

/// Dashboard for regular users: statistics over the companies they own.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDashboard {
    pub companies_owned: i64,
    pub total_capital: i64,
}

impl From<UserStats> for UserDashboard {
    fn from(stats: UserStats) -> Self {
        Self {
            companies_owned: stats.companies_owned,
            total_capital: stats.total_capital,
        }
    }
}

/// Dashboard for admins and superadmins: platform-wide aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlatformDashboard {
    pub total_users: i64,
    pub total_companies: i64,
    pub total_admins: i64,
}

impl From<PlatformStats> for PlatformDashboard {
    fn from(stats: PlatformStats) -> Self {
        Self {
            total_users: stats.total_users,
            total_companies: stats.total_companies,
            total_admins: stats.total_admins,
        }
    }
}
