use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, http::StatusCode, http::header, test, web::Data};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

use clinic_billing::{
    auth::accounts::create_account,
    config::{ClinicDetails, Config},
    model::role::Role,
    receipt::cache::ReceiptCache,
    repository::{BillingStore, DUPLICATE_INVOICE, MemoryStore},
    routes,
};

const ADMIN: (&str, &str) = ("frontdesk", "frontdesk-pass");
const SUPER_ADMIN: (&str, &str) = ("owner", "owner-password");

fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        database_url: None,
        db_max_connections: 1,
        jwt_secret: "integration-test-secret".into(),
        access_token_ttl: 900,
        rate_login_per_min: 10_000,
        rate_protected_per_min: 10_000,
        log_dir: "logs".into(),
        log_level: "info".into(),
        clinic: ClinicDetails::default(),
        receipt_cache_capacity: 16,
        receipt_cache_ttl_secs: 60,
        bootstrap_admin: None,
        bootstrap_super_admin: None,
    }
}

async fn seeded_store() -> Arc<dyn BillingStore> {
    let store: Arc<dyn BillingStore> = Arc::new(MemoryStore::new());
    create_account(store.as_ref(), ADMIN.0, ADMIN.1, Role::Admin)
        .await
        .unwrap();
    create_account(store.as_ref(), SUPER_ADMIN.0, SUPER_ADMIN.1, Role::SuperAdmin)
        .await
        .unwrap();
    store
}

macro_rules! app {
    () => {{
        let config = test_config();
        let store = Data::from(seeded_store().await);
        let receipts = Data::new(ReceiptCache::new(
            config.receipt_cache_capacity,
            Duration::from_secs(config.receipt_cache_ttl_secs),
        ));
        let config = Data::new(config);
        test::init_service(
            App::new()
                .app_data(store)
                .app_data(receipts)
                .app_data(config.clone())
                .configure(|cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

fn get(uri: &str, token: Option<&str>) -> test::TestRequest {
    with_token(test::TestRequest::get().uri(uri), token)
}

fn post(uri: &str, token: Option<&str>, body: Value) -> test::TestRequest {
    with_token(test::TestRequest::post().uri(uri).set_json(body), token)
}

fn with_token(req: test::TestRequest, token: Option<&str>) -> test::TestRequest {
    let req = req.peer_addr(peer());
    match token {
        Some(t) => req.insert_header((header::AUTHORIZATION, format!("Bearer {t}"))),
        None => req,
    }
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn money(v: &Value) -> Decimal {
    v.as_str().unwrap().parse().unwrap()
}

macro_rules! login {
    ($app:expr, $path:expr, $creds:expr) => {{
        let req = post(
            $path,
            None,
            json!({ "username": $creds.0, "password": $creds.1 }),
        )
        .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        body["access_token"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn home_is_public() {
    let app = app!();
    let resp = test::call_service(&app, get("/", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["logins"]["admin"], "/admin_login");
    assert_eq!(body["logins"]["super_admin"], "/super_admin_login");
}

#[actix_web::test]
async fn login_returns_token_and_dashboard() {
    let app = app!();
    let req = post(
        "/super_admin_login",
        None,
        json!({ "username": SUPER_ADMIN.0, "password": SUPER_ADMIN.1 }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["redirect"], "/super_admin_dashboard");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

#[actix_web::test]
async fn wrong_password_is_rejected_with_flash() {
    let app = app!();
    let req = post(
        "/admin_login",
        None,
        json!({ "username": ADMIN.0, "password": "not-the-password" }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["flash"]["category"], "danger");
    assert_eq!(
        body["flash"]["message"],
        "Invalid username or password for Admin"
    );
}

#[actix_web::test]
async fn login_entry_point_must_match_role() {
    let app = app!();
    let req = post(
        "/admin_login",
        None,
        json!({ "username": SUPER_ADMIN.0, "password": SUPER_ADMIN.1 }),
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn anonymous_callers_are_sent_to_login() {
    let app = app!();

    let resp = test::call_service(&app, get("/admin_dashboard", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin_login");

    let resp = test::call_service(&app, get("/system_settings", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/super_admin_login");

    // receipts are gated too
    let resp = test::call_service(&app, get("/download_receipt/1", None).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin_login");
}

#[actix_web::test]
async fn anonymous_garbage_body_still_redirects_to_login() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/create_invoice")
        .peer_addr(peer())
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin_login");
}

#[actix_web::test]
async fn forged_token_is_treated_as_anonymous() {
    let app = app!();
    let resp = test::call_service(
        &app,
        get("/admin_dashboard", Some("not.a.jwt")).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin_login");
}

#[actix_web::test]
async fn admin_cannot_reach_super_admin_pages() {
    let app = app!();
    let token = login!(app, "/admin_login", ADMIN);

    let resp = test::call_service(
        &app,
        get("/super_admin_dashboard", Some(&token)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["flash"]["message"], "Unauthorized access!");

    let resp = test::call_service(
        &app,
        post(
            "/system_settings/add_staff",
            Some(&token),
            json!({ "first_name": "A", "last_name": "B", "abn": "1" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let resp = test::call_service(&app, get("/admin_dashboard", Some(&token)).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn invoice_to_receipt_flow() {
    let app = app!();
    let root = login!(app, "/super_admin_login", SUPER_ADMIN);
    let root = Some(root.as_str());

    // empty lists warn on the invoice form
    let resp = test::call_service(&app, get("/create_invoice", root).to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["flash"]["category"], "warning");

    let resp = test::call_service(
        &app,
        post(
            "/system_settings/add_staff",
            root,
            json!({
                "first_name": "Jane",
                "last_name": "Citizen",
                "abn": "51 824 753 556",
                "facility_fees_percent": "10.00"
            }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/system_settings/staff");
    let body: Value = test::read_body_json(resp).await;
    let emp_id = body["staff"]["emp_id"].as_u64().unwrap();

    let resp = test::call_service(
        &app,
        post(
            "/system_settings/add_pay_period",
            root,
            json!({ "period_start_date": "2026-01-01", "period_end_date": "2026-01-14" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let body: Value = test::read_body_json(resp).await;
    let serial = body["pay_period"]["period_serial"].as_u64().unwrap();

    // an Admin does the invoicing
    let admin = login!(app, "/admin_login", ADMIN);
    let admin = Some(admin.as_str());

    let resp = test::call_service(
        &app,
        get(&format!("/get_doctor_details/{emp_id}"), admin).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(money(&body["facility_fee"]), dec!(10));
    assert_eq!(money(&body["gst"]), dec!(1));

    let resp = test::call_service(
        &app,
        post(
            "/create_invoice",
            admin,
            json!({
                "inv_number": "INV-2026-0001",
                "inv_date": "2026-01-15",
                "doctor": emp_id,
                "pay_period": serial
            }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["flash"]["message"], "Invoice created successfully!");
    let inv_id = body["invoice"]["inv_id"].as_u64().unwrap();

    for (reference, amount) in [("MC-1", "100.00"), ("MC-2", "50.00")] {
        let resp = test::call_service(
            &app,
            post(
                &format!("/add_billings/{inv_id}"),
                admin,
                json!({
                    "billing_date": "2026-01-03",
                    "billing_type": "Medicare",
                    "billing_ref": reference,
                    "billing_amount": amount
                }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), format!("/add_billings/{inv_id}"));
    }

    let resp = test::call_service(
        &app,
        get(&format!("/add_billings/{inv_id}"), admin).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["billings"].as_array().unwrap().len(), 2);
    assert_eq!(money(&body["invoice"]["gross_amount"]), dec!(150));

    let resp = test::call_service(
        &app,
        get(&format!("/full_receipt/{inv_id}"), admin).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totals"]["total_billing"], "150.00");
    assert_eq!(body["totals"]["facility_fee_amount"], "15.00");
    assert_eq!(body["totals"]["gst_amount"], "0.00");
    assert_eq!(body["totals"]["net_payment"], "135.00");
    assert_eq!(body["doctor"]["name"], "Jane Citizen");

    let first = test::call_service(
        &app,
        get(&format!("/download_receipt/{inv_id}"), admin).to_request(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(
        first.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = first
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(&format!("receipt_{inv_id}.pdf")));
    let first = test::read_body(first).await;
    assert!(first.starts_with(b"%PDF"));

    let again = test::call_service(
        &app,
        get(&format!("/download_receipt/{inv_id}"), admin).to_request(),
    )
    .await;
    assert_eq!(test::read_body(again).await, first);

    // a new billing changes the document
    let resp = test::call_service(
        &app,
        post(
            &format!("/add_billings/{inv_id}"),
            admin,
            json!({ "billing_type": "Private", "billing_ref": "PV-1", "billing_amount": "25.50" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let updated = test::call_service(
        &app,
        get(&format!("/download_receipt/{inv_id}"), admin).to_request(),
    )
    .await;
    assert_ne!(test::read_body(updated).await, first);

    let resp = test::call_service(&app, get("/admin/view-receipts", admin).to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    let receipts = body.as_array().unwrap();
    assert_eq!(receipts.len(), 1);
    assert_eq!(receipts[0]["doctor"], "Jane Citizen");
    assert_eq!(receipts[0]["billings"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn invoice_rules_are_enforced() {
    let app = app!();
    let root = login!(app, "/super_admin_login", SUPER_ADMIN);
    let root = Some(root.as_str());

    test::call_service(
        &app,
        post(
            "/system_settings/add_staff",
            root,
            json!({ "first_name": "Sam", "last_name": "Lee", "abn": "12 345 678 901" }),
        )
        .to_request(),
    )
    .await;
    test::call_service(
        &app,
        post(
            "/system_settings/add_pay_period",
            root,
            json!({ "period_start_date": "2026-02-01", "period_end_date": "2026-02-14" }),
        )
        .to_request(),
    )
    .await;

    let invoice = json!({ "inv_number": "INV-7", "doctor": 1, "pay_period": 1 });

    let resp = test::call_service(&app, post("/create_invoice", root, invoice.clone()).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = test::call_service(&app, post("/create_invoice", root, invoice).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["flash"]["message"], DUPLICATE_INVOICE);

    let resp = test::call_service(
        &app,
        post("/create_invoice", root, json!({ "inv_number": "INV-8" })).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["flash"]["message"],
        "Missing required fields. Please fill out the form completely."
    );

    let resp = test::call_service(
        &app,
        post(
            "/create_invoice",
            root,
            json!({ "inv_number": "INV-9", "doctor": 99, "pay_period": 1 }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    for amount in ["-1.00", "10.005", "10000000000.00"] {
        let resp = test::call_service(
            &app,
            post(
                "/add_billings/1",
                root,
                json!({ "billing_type": "Medicare", "billing_ref": "X", "billing_amount": amount }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "amount {amount}");
    }

    // the running total is capped as well as each line
    let line = |amount: &str| {
        json!({ "billing_type": "Medicare", "billing_ref": "X", "billing_amount": amount })
    };
    let resp = test::call_service(&app, post("/add_billings/1", root, line("9999999999.99")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let resp = test::call_service(&app, post("/add_billings/1", root, line("0.01")).to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = test::call_service(&app, get("/add_billings/1", root).to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(money(&body["invoice"]["gross_amount"]), dec!(9999999999.99));

    let resp = test::call_service(
        &app,
        post(
            "/create_invoice",
            root,
            json!({ "inv_number": "N".repeat(65), "doctor": 1, "pay_period": 1 }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["flash"]["message"],
        "Invoice number must be at most 64 characters"
    );

    let resp = test::call_service(
        &app,
        post(
            "/add_billings/404",
            root,
            json!({ "billing_type": "Medicare", "billing_ref": "X", "billing_amount": "1.00" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unknown_doctor_reports_not_found() {
    let app = app!();
    let token = login!(app, "/admin_login", ADMIN);

    let resp = test::call_service(
        &app,
        get("/get_doctor_details/42", Some(&token)).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Doctor not found");
}

#[actix_web::test]
async fn overlapping_pay_period_is_refused() {
    let app = app!();
    let root = login!(app, "/super_admin_login", SUPER_ADMIN);
    let root = Some(root.as_str());

    let add = |start: &str, end: &str| {
        post(
            "/system_settings/add_pay_period",
            root,
            json!({ "period_start_date": start, "period_end_date": end }),
        )
        .to_request()
    };

    let resp = test::call_service(&app, add("2026-03-01", "2026-03-14")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    // contained inside the first range
    let resp = test::call_service(&app, add("2026-03-05", "2026-03-10")).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = test::call_service(&app, add("2026-03-20", "2026-03-10")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        post("/system_settings/add_pay_period", root, json!({})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["flash"]["message"], "Start Date and End Date are required!");

    let resp = test::call_service(&app, add("2026-03-15", "2026-03-28")).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[actix_web::test]
async fn settings_tables_and_admin_accounts() {
    let app = app!();
    let root = login!(app, "/super_admin_login", SUPER_ADMIN);
    let root = Some(root.as_str());

    let resp = test::call_service(&app, get("/system_settings/invoices", root).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Invoices");
    assert_eq!(body["rows"].as_array().unwrap().len(), 0);
    assert_eq!(body["flash"]["category"], "info");
    assert_eq!(
        body["flash"]["message"],
        "No data available in the Invoices table."
    );

    let resp = test::call_service(
        &app,
        post(
            "/system_settings/add_admin",
            root,
            json!({ "username": "reception", "password": "short" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = test::call_service(
        &app,
        post(
            "/system_settings/add_admin",
            root,
            json!({ "username": "reception", "password": "reception-pass" }),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = test::call_service(&app, get("/system_settings/admins", root).to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(body.get("flash").is_none());
    assert!(rows.iter().all(|r| r.get("password_hash").is_none()));

    // the new account can log in through the Admin door
    let _ = login!(app, "/admin_login", ("reception", "reception-pass"));
}
