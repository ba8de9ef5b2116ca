use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::{
    api::{check_amount, check_len, parse_body, required, see_other},
    auth::{auth::Session, gate::Operation},
    error::{AppError, AppResult, Flash},
    model::{
        billing::{BILLING_REF_MAX_LEN, BILLING_TYPE_MAX_LEN, Billing, NewBilling},
        invoice::{INV_NUMBER_MAX_LEN, Invoice, NewInvoice},
        pay_period::PayPeriod,
        staff::Staff,
    },
    receipt::cache::ReceiptCache,
    repository::BillingStore,
};

pub const MISSING_FIELDS: &str = "Missing required fields. Please fill out the form completely.";

#[derive(Serialize, ToSchema)]
pub struct InvoiceForm {
    pub pay_periods: Vec<PayPeriod>,
    pub doctors: Vec<Staff>,
    #[schema(value_type = Option<Object>)]
    pub flash: Option<Flash>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInvoice {
    #[schema(example = "INV-2026-0001")]
    pub inv_number: Option<String>,
    #[schema(example = "2026-01-15", format = "date", value_type = Option<String>)]
    pub inv_date: Option<NaiveDate>,
    #[schema(example = "2026-01-20", format = "date", value_type = Option<String>)]
    pub paid_date: Option<NaiveDate>,
    /// Staff `emp_id`.
    #[schema(example = 1)]
    pub doctor: Option<u64>,
    /// Pay period serial.
    #[schema(example = 1)]
    pub pay_period: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct BillingPage {
    pub invoice: Invoice,
    pub billings: Vec<Billing>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddBilling {
    #[schema(example = "2026-01-03", format = "date", value_type = Option<String>)]
    pub billing_date: Option<NaiveDate>,
    #[schema(example = "Medicare")]
    pub billing_type: Option<String>,
    #[schema(example = "MC-0001")]
    pub billing_ref: Option<String>,
    #[schema(example = "100.00", value_type = Option<String>)]
    pub billing_amount: Option<Decimal>,
}

#[utoipa::path(
    get,
    path = "/create_invoice",
    responses(
        (status = 200, description = "Doctors and pay periods to pick from", body = InvoiceForm),
        (status = 303, description = "Redirect to login or home")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoicing"
)]
pub async fn create_invoice_form(
    session: Session,
    store: web::Data<dyn BillingStore>,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::CreateInvoice)?;

    let pay_periods = store.list_pay_periods().await?;
    let doctors = store.list_staff().await?;

    let flash = if pay_periods.is_empty() || doctors.is_empty() {
        Some(Flash::warning(
            "Pay Periods or Doctors data is missing. Please ensure the database is properly populated.",
        ))
    } else {
        None
    };

    Ok(HttpResponse::Ok().json(InvoiceForm {
        pay_periods,
        doctors,
        flash,
    }))
}

#[utoipa::path(
    post,
    path = "/create_invoice",
    request_body = CreateInvoice,
    responses(
        (status = 303, description = "Invoice created, continue to its billings", body = Invoice),
        (status = 400, description = "Missing required fields"),
        (status = 404, description = "Doctor or pay period does not exist"),
        (status = 409, description = "Invoice number already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoicing"
)]
#[instrument(skip(session, store, body))]
pub async fn create_invoice(
    session: Session,
    store: web::Data<dyn BillingStore>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let user = session.authorize(Operation::CreateInvoice)?;
    let payload: CreateInvoice = parse_body(&body)?;

    let (Some(inv_number), Some(doctor), Some(pay_period)) =
        (required(payload.inv_number), payload.doctor, payload.pay_period)
    else {
        return Err(AppError::Validation(MISSING_FIELDS.into()));
    };
    let inv_number = check_len("Invoice number", inv_number, INV_NUMBER_MAX_LEN)?;

    let invoice = store
        .create_invoice(NewInvoice {
            inv_number,
            inv_date: payload.inv_date,
            paid_on: payload.paid_date,
            ref_emp_id: doctor,
            ref_period_serial: pay_period,
        })
        .await?;

    info!(
        inv_id = invoice.inv_id,
        inv_number = %invoice.inv_number,
        by = %user.username,
        "Invoice created"
    );

    Ok(see_other(
        format!("/add_billings/{}", invoice.inv_id),
        json!({
            "flash": Flash::success("Invoice created successfully!"),
            "invoice": invoice,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/add_billings/{invoice_id}",
    params(("invoice_id", Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice and its billings", body = BillingPage),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoicing"
)]
pub async fn billings_page(
    session: Session,
    store: web::Data<dyn BillingStore>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::AddBilling)?;
    let invoice_id = path.into_inner();

    let invoice = store
        .get_invoice(invoice_id)
        .await?
        .ok_or(AppError::NotFound("Invoice"))?;
    let billings = store.billings_for_invoice(invoice_id).await?;

    Ok(HttpResponse::Ok().json(BillingPage { invoice, billings }))
}

#[utoipa::path(
    post,
    path = "/add_billings/{invoice_id}",
    params(("invoice_id", Path, description = "Invoice id")),
    request_body = AddBilling,
    responses(
        (status = 303, description = "Billing recorded", body = Billing),
        (status = 400, description = "Missing or invalid fields"),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Invoicing"
)]
#[instrument(skip(session, store, cache, body))]
pub async fn add_billing(
    session: Session,
    store: web::Data<dyn BillingStore>,
    cache: web::Data<ReceiptCache>,
    path: web::Path<u64>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::AddBilling)?;
    let invoice_id = path.into_inner();
    let payload: AddBilling = parse_body(&body)?;

    let (Some(billing_type), Some(billing_ref), Some(amount)) = (
        required(payload.billing_type),
        required(payload.billing_ref),
        payload.billing_amount,
    ) else {
        return Err(AppError::Validation(MISSING_FIELDS.into()));
    };

    let billing_type = check_len("Billing type", billing_type, BILLING_TYPE_MAX_LEN)?;
    let billing_ref = check_len("Billing reference", billing_ref, BILLING_REF_MAX_LEN)?;
    let billing_amount = check_amount("Billing amount", amount)?;

    let billing = store
        .add_billing(
            invoice_id,
            NewBilling {
                billing_date: payload.billing_date,
                billing_type,
                billing_ref,
                billing_amount,
            },
        )
        .await?;

    // the stored PDF no longer reflects this invoice
    cache.invalidate(invoice_id).await;

    info!(
        invoice_id,
        billing_id = billing.billing_id,
        amount = %billing.billing_amount,
        "Billing added"
    );

    Ok(see_other(
        format!("/add_billings/{invoice_id}"),
        json!({
            "flash": Flash::success("Billing added successfully!"),
            "billing": billing,
        }),
    ))
}
