use std::collections::HashMap;

use actix_web::{
    HttpResponse,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web,
};
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::{
    auth::{auth::Session, gate::Operation},
    config::Config,
    error::{AppError, AppResult},
    model::{billing::Billing, invoice::Invoice},
    receipt::{self, Receipt, cache::ReceiptCache, pdf},
    repository::BillingStore,
};

/// Invoice, doctor, pay period and billings gathered into one receipt.
/// Doctor and pay period are optional on the receipt.
pub async fn load_receipt(
    store: &dyn BillingStore,
    config: &Config,
    invoice_id: u64,
) -> AppResult<Receipt> {
    let invoice = store
        .get_invoice(invoice_id)
        .await?
        .ok_or(AppError::NotFound("Invoice"))?;

    let doctor = store.get_staff(invoice.ref_emp_id).await?;
    let pay_period = store.get_pay_period(invoice.ref_period_serial).await?;
    let billings = store.billings_for_invoice(invoice_id).await?;

    Ok(Receipt::build(
        &config.clinic,
        &invoice,
        doctor.as_ref(),
        pay_period.as_ref(),
        &billings,
    ))
}

#[utoipa::path(
    get,
    path = "/full_receipt/{invoice_id}",
    params(("invoice_id", Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Receipt with computed totals", body = Receipt),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Receipts"
)]
pub async fn full_receipt(
    session: Session,
    store: web::Data<dyn BillingStore>,
    config: web::Data<Config>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::ViewReceipt)?;

    let receipt = load_receipt(store.get_ref(), &config, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(receipt))
}

#[utoipa::path(
    get,
    path = "/download_receipt/{invoice_id}",
    params(("invoice_id", Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Receipt PDF", content_type = "application/pdf"),
        (status = 404, description = "Invoice not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Receipts"
)]
pub async fn download_receipt(
    session: Session,
    store: web::Data<dyn BillingStore>,
    config: web::Data<Config>,
    cache: web::Data<ReceiptCache>,
    path: web::Path<u64>,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::DownloadReceipt)?;
    let invoice_id = path.into_inner();

    // always read current state; the cache only saves the render
    let receipt = load_receipt(store.get_ref(), &config, invoice_id).await?;

    let document = match cache.get(&receipt).await {
        Some(bytes) => {
            debug!(invoice_id, "Receipt served from cache");
            bytes
        }
        None => {
            let current = receipt.clone();
            let bytes = web::block(move || pdf::render(&current))
                .await
                .map_err(|e| AppError::Internal(e.to_string()))??;

            let bytes = web::Bytes::from(bytes);
            info!(invoice_id, size = bytes.len(), "Receipt rendered");
            cache.put(receipt, bytes.clone()).await;
            bytes
        }
    };

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(receipt::file_name(invoice_id))],
        })
        .body(document))
}

#[derive(Serialize, ToSchema)]
pub struct ReceiptSummary {
    pub invoice: Invoice,
    pub doctor: Option<String>,
    pub billings: Vec<Billing>,
}

#[utoipa::path(
    get,
    path = "/admin/view-receipts",
    responses(
        (status = 200, description = "Every invoice with its doctor and billings", body = [ReceiptSummary])
    ),
    security(("bearer_auth" = [])),
    tag = "Receipts"
)]
pub async fn view_past_receipts(
    session: Session,
    store: web::Data<dyn BillingStore>,
) -> AppResult<HttpResponse> {
    session.authorize(Operation::ViewPastReceipts)?;

    let invoices = store.list_invoices().await?;

    let doctors: HashMap<u64, String> = store
        .list_staff()
        .await?
        .into_iter()
        .map(|s| (s.emp_id, s.full_name()))
        .collect();

    let mut billings: HashMap<u64, Vec<Billing>> = HashMap::new();
    for b in store.list_billings().await? {
        billings.entry(b.ref_inv_id).or_default().push(b);
    }

    let summaries: Vec<ReceiptSummary> = invoices
        .into_iter()
        .map(|invoice| ReceiptSummary {
            doctor: doctors.get(&invoice.ref_emp_id).cloned(),
            billings: billings.remove(&invoice.inv_id).unwrap_or_default(),
            invoice,
        })
        .collect();

    Ok(HttpResponse::Ok().json(summaries))
}
