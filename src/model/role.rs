use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum Role {
    #[strum(serialize = "Admin")]
    #[serde(rename = "Admin")]
    Admin,
    #[strum(serialize = "Super Admin")]
    #[serde(rename = "Super Admin")]
    SuperAdmin,
}

impl Role {
    pub fn from_name(name: &str) -> Option<Self> {
        name.parse().ok()
    }

    /// Where a successful login for this role lands.
    pub fn dashboard_path(self) -> &'static str {
        match self {
            Role::Admin => "/admin_dashboard",
            Role::SuperAdmin => "/super_admin_dashboard",
        }
    }

    pub fn login_path(self) -> &'static str {
        match self {
            Role::Admin => "/admin_login",
            Role::SuperAdmin => "/super_admin_login",
        }
    }
}
