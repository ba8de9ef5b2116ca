use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::{
    auth::{auth::Session, gate::Operation},
    error::AppResult,
    model::role::Role,
    repository::BillingStore,
};

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Landing page with login entry points")),
    tag = "Dashboard"
)]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "title": "Clinic Billing",
        "logins": {
            "admin": Role::Admin.login_path(),
            "super_admin": Role::SuperAdmin.login_path(),
        }
    }))
}

#[utoipa::path(
    get,
    path = "/admin_dashboard",
    responses(
        (status = 200, description = "Admin dashboard"),
        (status = 303, description = "Redirect to login or home")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn admin_dashboard(
    session: Session,
    store: web::Data<dyn BillingStore>,
) -> AppResult<HttpResponse> {
    let user = session.authorize(Operation::AdminDashboard)?;

    let invoices = store.list_invoices().await?.len();

    Ok(HttpResponse::Ok().json(json!({
        "user": user.username,
        "role": user.role,
        "invoice_count": invoices,
        "links": {
            "create_invoice": "/create_invoice",
            "view_receipts": "/admin/view-receipts",
        }
    })))
}

#[utoipa::path(
    get,
    path = "/super_admin_dashboard",
    responses(
        (status = 200, description = "Super Admin dashboard"),
        (status = 303, description = "Redirect to login or home")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn super_admin_dashboard(
    session: Session,
    store: web::Data<dyn BillingStore>,
) -> AppResult<HttpResponse> {
    let user = session.authorize(Operation::SuperAdminDashboard)?;

    let staff = store.list_staff().await?.len();
    let pay_periods = store.list_pay_periods().await?.len();
    let admins = store.list_users(Role::Admin).await?.len();

    Ok(HttpResponse::Ok().json(json!({
        "user": user.username,
        "role": user.role,
        "staff_count": staff,
        "pay_period_count": pay_periods,
        "admin_count": admins,
        "links": {
            "create_invoice": "/create_invoice",
            "view_receipts": "/admin/view-receipts",
            "system_settings": "/system_settings",
        }
    })))
}
