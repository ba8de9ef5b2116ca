//! Role → operation permissions.

use crate::{
    auth::auth::AuthUser,
    error::{AppError, AppResult},
    model::role::Role,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Operation {
    AdminDashboard,
    CreateInvoice,
    AddBilling,
    ViewDoctorDetails,
    ViewReceipt,
    DownloadReceipt,
    ViewPastReceipts,

    SuperAdminDashboard,
    SystemSettings,
    ViewTables,
    ManageStaff,
    ManagePayPeriods,
    ManageAdmins,
}

impl Operation {
    pub fn requires_super_admin(self) -> bool {
        matches!(
            self,
            Operation::SuperAdminDashboard
                | Operation::SystemSettings
                | Operation::ViewTables
                | Operation::ManageStaff
                | Operation::ManagePayPeriods
                | Operation::ManageAdmins
        )
    }

    /// Login entry point an anonymous caller is sent to.
    pub fn login_path(self) -> &'static str {
        if self.requires_super_admin() {
            Role::SuperAdmin.login_path()
        } else {
            Role::Admin.login_path()
        }
    }
}

pub fn permits(role: Role, op: Operation) -> bool {
    match role {
        Role::SuperAdmin => true,
        Role::Admin => !op.requires_super_admin(),
    }
}

pub fn authorize(user: Option<&AuthUser>, op: Operation) -> AppResult<&AuthUser> {
    let user = user.ok_or(AppError::Unauthenticated { login_path: op.login_path() })?;

    if permits(user.role, op) {
        Ok(user)
    } else {
        tracing::info!(user_id = user.user_id, ?op, "Operation refused for role");
        Err(AppError::Forbidden)
    }
}
