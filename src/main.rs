use std::sync::Arc;
use std::time::Duration;

use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use clinic_billing::{
    auth::accounts::ensure_account,
    config::Config,
    db::init_db,
    docs::ApiDoc,
    model::role::Role,
    receipt::cache::ReceiptCache,
    repository::{BillingStore, MemoryStore, MySqlStore},
    routes,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let store: Arc<dyn BillingStore> = match &config.database_url {
        Some(url) => {
            let pool = init_db(url, config.db_max_connections)
                .await
                .context("failed to initialise the database")?;
            Arc::new(MySqlStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set, using the in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if let Some(account) = &config.bootstrap_super_admin {
        ensure_account(store.as_ref(), account, Role::SuperAdmin)
            .await
            .context("failed to create the bootstrap Super Admin")?;
    }
    if let Some(account) = &config.bootstrap_admin {
        ensure_account(store.as_ref(), account, Role::Admin)
            .await
            .context("failed to create the bootstrap Admin")?;
    }

    let receipts = ReceiptCache::new(
        config.receipt_cache_capacity,
        Duration::from_secs(config.receipt_cache_ttl_secs),
    );

    let server_addr = config.server_addr.clone();
    let store = Data::from(store);
    let receipts = Data::new(receipts);
    let config = Data::new(config);

    info!(addr = %server_addr, "Listening");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(receipts.clone())
            .app_data(config.clone())
            // Public login routes plus role-gated pages, each with its own rate limit
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
