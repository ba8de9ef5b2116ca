use crate::api::invoice::{AddBilling, BillingPage, CreateInvoice, InvoiceForm};
use crate::api::receipt::ReceiptSummary;
use crate::api::settings::{AddAdmin, AddPayPeriod, AddStaff};
use crate::billing::{BillingTotals, DoctorFees};
use crate::model::{
    billing::Billing, invoice::Invoice, pay_period::PayPeriod, role::Role, staff::Staff,
};
use crate::models::{LoginReqDto, LoginResponse};
use crate::receipt::{
    ClinicHeader, Receipt, ReceiptDoctor, ReceiptInvoice, ReceiptLine, ReceiptPeriod,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clinic Billing API",
        version = "1.0.0",
        description = r#"
## Clinic Billing Administration

Back office for a medical clinic that invoices its doctors for billed services.

### 🔹 Key Features
- **Invoicing**
  - Create an invoice for a doctor and pay period, then record billing lines against it
- **Receipts**
  - View receipts with facility fee, GST and net payment, or download them as PDF
- **System Settings**
  - Super Admins maintain staff, pay periods and admin accounts

### 🔐 Security
Protected endpoints expect a **JWT Bearer** token from `/admin_login` or `/super_admin_login`.
Missing tokens redirect (303) to the login page; insufficient roles redirect home.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::home::home,
        crate::api::home::admin_dashboard,
        crate::api::home::super_admin_dashboard,

        crate::auth::handlers::admin_login_page,
        crate::auth::handlers::admin_login,
        crate::auth::handlers::super_admin_login_page,
        crate::auth::handlers::super_admin_login,

        crate::api::invoice::create_invoice_form,
        crate::api::invoice::create_invoice,
        crate::api::invoice::billings_page,
        crate::api::invoice::add_billing,
        crate::api::doctor::get_doctor_details,

        crate::api::receipt::full_receipt,
        crate::api::receipt::download_receipt,
        crate::api::receipt::view_past_receipts,

        crate::api::settings::system_settings,
        crate::api::settings::view_admins,
        crate::api::settings::view_invoices,
        crate::api::settings::view_billings,
        crate::api::settings::view_staff,
        crate::api::settings::view_pay_periods,
        crate::api::settings::add_pay_period,
        crate::api::settings::add_staff,
        crate::api::settings::add_admin
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            Role,
            Invoice,
            Billing,
            Staff,
            PayPeriod,
            InvoiceForm,
            CreateInvoice,
            BillingPage,
            AddBilling,
            DoctorFees,
            BillingTotals,
            ClinicHeader,
            ReceiptInvoice,
            ReceiptDoctor,
            ReceiptPeriod,
            ReceiptLine,
            Receipt,
            ReceiptSummary,
            AddPayPeriod,
            AddStaff,
            AddAdmin
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Admin and Super Admin login"),
        (name = "Dashboard", description = "Landing page and dashboards"),
        (name = "Invoicing", description = "Invoices, billings and doctor fees"),
        (name = "Receipts", description = "Receipt views and PDF downloads"),
        (name = "System Settings", description = "Super Admin table maintenance"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
