use crate::{
    api::{doctor, home, invoice, receipt, settings},
    auth::handlers,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

// Per-route limiter keyed on the peer IP. A zero rate still admits one request
// per minute rather than failing the builder.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(60_000 / requests_per_min as u64)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(web::resource("/").route(web::get().to(home::home)))
        .service(
            web::resource("/admin_login")
                .wrap(login_limiter.clone())
                .route(web::get().to(handlers::admin_login_page))
                .route(web::post().to(handlers::admin_login)),
        )
        .service(
            web::resource("/super_admin_login")
                .wrap(login_limiter)
                .route(web::get().to(handlers::super_admin_login_page))
                .route(web::post().to(handlers::super_admin_login)),
        );

    // Protected routes; each handler checks the caller's role itself
    cfg.service(
        web::scope("")
            .wrap(protected_limiter)
            .route("/admin_dashboard", web::get().to(home::admin_dashboard))
            .route("/super_admin_dashboard", web::get().to(home::super_admin_dashboard))
            // invoicing
            .service(
                web::resource("/create_invoice")
                    .route(web::get().to(invoice::create_invoice_form))
                    .route(web::post().to(invoice::create_invoice)),
            )
            .service(
                web::resource("/add_billings/{invoice_id}")
                    .route(web::get().to(invoice::billings_page))
                    .route(web::post().to(invoice::add_billing)),
            )
            .route(
                "/get_doctor_details/{staff_id}",
                web::get().to(doctor::get_doctor_details),
            )
            // receipts
            .route("/full_receipt/{invoice_id}", web::get().to(receipt::full_receipt))
            .route(
                "/download_receipt/{invoice_id}",
                web::get().to(receipt::download_receipt),
            )
            .route("/admin/view-receipts", web::get().to(receipt::view_past_receipts))
            // system settings
            .service(
                web::scope("/system_settings")
                    .route("", web::get().to(settings::system_settings))
                    .route("/admins", web::get().to(settings::view_admins))
                    .route("/invoices", web::get().to(settings::view_invoices))
                    .route("/billings", web::get().to(settings::view_billings))
                    .route("/staff", web::get().to(settings::view_staff))
                    .route("/pay_periods", web::get().to(settings::view_pay_periods))
                    .route("/add_pay_period", web::post().to(settings::add_pay_period))
                    .route("/add_staff", web::post().to(settings::add_staff))
                    .route("/add_admin", web::post().to(settings::add_admin)),
            ),
    );
}

// LOGIN (/admin_login or /super_admin_login)
//  └─ access_token carrying the account role

// PROTECTED REQUEST
//  └─ Authorization: Bearer access_token
//       ├─ no/expired token  → 303 to the matching login page
//       └─ role too low      → 303 to / with "Unauthorized access!"
