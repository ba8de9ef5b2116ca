use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    api::{check_len, check_scale, parse_body, required, see_other},
    auth::{accounts::create_account, auth::Session, gate::Operation},
    error::{AppError, AppResult, Flash},
    model::{
        billing, invoice,
        pay_period::{self, NewPayPeriod},
        role::Role,
        staff::{self, ABN_MAX_LEN, NAME_MAX_LEN, NewStaff},
    },
    repository::BillingStore,
};

const ADMIN_COLUMNS: &[&str] = &["id", "username", "role"];

pub const INVALID_STAFF: &str = "Error adding staff. Please check your input.";

/// One settings table rendered generically: column names plus raw rows.
#[derive(Serialize)]
pub struct TableView<T: Serialize> {
    pub title: &'static str,
    pub table_name: &'static str,
    pub columns: &'static [&'static str],
    pub rows: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
}

impl<T: Serialize> TableView<T> {
    fn new(
        title: &'static str,
        table_name: &'static str,
        columns: &'static [&'static str],
        rows: Vec<T>,
    ) -> Self {
        let flash = rows
            .is_empty()
            .then(|| Flash::info(format!("No data available in the {title} table.")));
        Self {
            title,
            table_name,
            columns,
            rows,
            flash,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddPayPeriod {
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    pub period_start_date: Option<NaiveDate>,
    #[schema(example = "2026-01-14", format = "date", value_type = Option<String>)]
    pub period_end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddStaff {
    #[schema(example = "Jane")]
    pub first_name: Option<String>,
    #[schema(example = "Citizen")]
    pub last_name: Option<String>,
    #[schema(example = "51 824 753 556")]
    pub abn: Option<String>,
    /// Defaults to 0 when omitted.
    #[schema(example = "35.00", value_type = Option<String>)]
    pub facility_fees_percent: Option<Decimal>,
}

#[derive(Deserialize, ToSchema)]
pub struct AddAdmin {
    #[schema(example = "frontdesk")]
    pub username: String,
    #[schema(example = "correct-horse")]
    pub password: String,
}

#[utoipa::path(
    get,
    path = "/system_settings",
    responses(
        (status = 200, description = "Tables available to Super Admins"),
        (status = 303, description = "Redirect to login or home")
    ),
    security(("bearer_auth" = [])),
    tag = "System Settings"
)]
pub async fn system_settings(session: Session) -> AppResult<HttpResponse> {
    session.authorize(Operation::SystemSettings)?;

    Ok(HttpResponse::Ok().json(json!({
        "tables": [
            { "title": "Admins", "path": "/system_settings/admins" },
            { "title": "Invoices", "path": "/system_settings/invoices" },
            { "title": "Billings", "path": "/system_settings/billings" },
            { "title": "Staff", "path": "/system_settings/staff" },
            { "title": "Pay Periods", "path": "/system_settings/pay_periods" },
        ]
    })))
}

#[utoipa::path(
    get,
    path = "/system_settings/admins",
    responses((status = 200, description = "Admin accounts, without password hashes")),
    security(("bearer_auth" = [])),
    tag = "System Settings"
)]
pub async fn view_admins(
    session: Session,
    store: web::Data<dyn BillingStore>,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::ViewTables)?;
    let rows = store.list_users(Role::Admin).await?;
    Ok(HttpResponse::Ok().json(TableView::new("Admins", "users", ADMIN_COLUMNS, rows)))
}

#[utoipa::path(
    get,
    path = "/system_settings/invoices",
    responses((status = 200, description = "Invoices table")),
    security(("bearer_auth" = [])),
    tag = "System Settings"
)]
pub async fn view_invoices(
    session: Session,
    store: web::Data<dyn BillingStore>,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::ViewTables)?;
    let rows = store.list_invoices().await?;
    Ok(HttpResponse::Ok().json(TableView::new("Invoices", "invoices", invoice::COLUMNS, rows)))
}

#[utoipa::path(
    get,
    path = "/system_settings/billings",
    responses((status = 200, description = "Billings table")),
    security(("bearer_auth" = [])),
    tag = "System Settings"
)]
pub async fn view_billings(
    session: Session,
    store: web::Data<dyn BillingStore>,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::ViewTables)?;
    let rows = store.list_billings().await?;
    Ok(HttpResponse::Ok().json(TableView::new("Billings", "billings", billing::COLUMNS, rows)))
}

#[utoipa::path(
    get,
    path = "/system_settings/staff",
    responses((status = 200, description = "Staff table")),
    security(("bearer_auth" = [])),
    tag = "System Settings"
)]
pub async fn view_staff(
    session: Session,
    store: web::Data<dyn BillingStore>,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::ViewTables)?;
    let rows = store.list_staff().await?;
    Ok(HttpResponse::Ok().json(TableView::new("Staff", "staff", staff::COLUMNS, rows)))
}

#[utoipa::path(
    get,
    path = "/system_settings/pay_periods",
    responses((status = 200, description = "Pay periods table")),
    security(("bearer_auth" = [])),
    tag = "System Settings"
)]
pub async fn view_pay_periods(
    session: Session,
    store: web::Data<dyn BillingStore>,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::ViewTables)?;
    let rows = store.list_pay_periods().await?;
    Ok(HttpResponse::Ok().json(TableView::new(
        "Pay Periods",
        "pay_periods",
        pay_period::COLUMNS,
        rows,
    )))
}

#[utoipa::path(
    post,
    path = "/system_settings/add_pay_period",
    request_body = AddPayPeriod,
    responses(
        (status = 303, description = "Pay period added"),
        (status = 400, description = "Missing dates or start after end"),
        (status = 409, description = "Overlaps an existing pay period")
    ),
    security(("bearer_auth" = [])),
    tag = "System Settings"
)]
#[instrument(skip(session, store, body))]
pub async fn add_pay_period(
    session: Session,
    store: web::Data<dyn BillingStore>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::ManagePayPeriods)?;
    let payload: AddPayPeriod = parse_body(&body)?;

    let (Some(start), Some(end)) = (payload.period_start_date, payload.period_end_date) else {
        return Err(AppError::Validation(
            "Start Date and End Date are required!".into(),
        ));
    };

    let period = store.add_pay_period(NewPayPeriod { start, end }).await?;
    info!(serial = period.period_serial, %start, %end, "Pay period added");

    Ok(see_other(
        "/system_settings/pay_periods",
        json!({
            "flash": Flash::success("Pay Period added successfully!"),
            "pay_period": period,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/system_settings/add_staff",
    request_body = AddStaff,
    responses(
        (status = 303, description = "Staff member added"),
        (status = 400, description = "Missing or invalid fields")
    ),
    security(("bearer_auth" = [])),
    tag = "System Settings"
)]
#[instrument(skip(session, store, body))]
pub async fn add_staff(
    session: Session,
    store: web::Data<dyn BillingStore>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::ManageStaff)?;
    let payload: AddStaff = parse_body(&body)?;

    let (Some(first_name), Some(last_name), Some(abn)) = (
        required(payload.first_name),
        required(payload.last_name),
        required(payload.abn),
    ) else {
        return Err(AppError::Validation(INVALID_STAFF.into()));
    };
    let first_name = check_len("First name", first_name, NAME_MAX_LEN)?;
    let last_name = check_len("Last name", last_name, NAME_MAX_LEN)?;
    let abn = check_len("ABN", abn, ABN_MAX_LEN)?;

    let percent = payload.facility_fees_percent.unwrap_or(Decimal::ZERO);
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(AppError::Validation(INVALID_STAFF.into()));
    }
    let facility_fees_percent = check_scale("Facility fee percentage", percent)?;

    let staff = store
        .add_staff(NewStaff {
            first_name,
            last_name,
            abn,
            facility_fees_percent,
        })
        .await?;
    info!(emp_id = staff.emp_id, "Staff added");

    Ok(see_other(
        "/system_settings/staff",
        json!({
            "flash": Flash::success("Staff added successfully!"),
            "staff": staff,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/system_settings/add_admin",
    request_body = AddAdmin,
    responses(
        (status = 303, description = "Admin account created"),
        (status = 400, description = "Username empty or password too short"),
        (status = 409, description = "Username already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "System Settings"
)]
#[instrument(skip(session, store, body))]
pub async fn add_admin(
    session: Session,
    store: web::Data<dyn BillingStore>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let by = session.authorize(Operation::ManageAdmins)?;
    let payload: AddAdmin = parse_body(&body)?;

    let user = create_account(
        store.get_ref(),
        &payload.username,
        &payload.password,
        Role::Admin,
    )
    .await?;
    info!(user_id = user.id, by = %by.username, "Admin account created");

    Ok(see_other(
        "/system_settings/admins",
        json!({
            "flash": Flash::success("Admin added successfully!"),
            "admin": user,
        }),
    ))
}
