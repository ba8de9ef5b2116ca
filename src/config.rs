use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;

/// Header printed at the top of every receipt.
#[derive(Clone, Debug)]
pub struct ClinicDetails {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl Default for ClinicDetails {
    fn default() -> Self {
        Self {
            name: "Griffith Medical Centre".to_string(),
            address: "1 Animoo Ave, Griffith NSW 2680, Australia".to_string(),
            phone: "+61 2 6964 5888".to_string(),
        }
    }
}

/// Account created at startup when it does not exist yet.
#[derive(Clone)]
pub struct BootstrapAccount {
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    /// `None` runs against the in-process store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub log_dir: String,
    pub log_level: String,

    pub clinic: ClinicDetails,
    pub receipt_cache_capacity: u64,
    pub receipt_cache_ttl_secs: u64,

    pub bootstrap_admin: Option<BootstrapAccount>,
    pub bootstrap_super_admin: Option<BootstrapAccount>,
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn bootstrap_account(prefix: &str) -> Result<Option<BootstrapAccount>> {
    let username = non_empty(&format!("{prefix}_USERNAME"));
    let password = non_empty(&format!("{prefix}_PASSWORD"));
    match (username, password) {
        (Some(username), Some(password)) => Ok(Some(BootstrapAccount { username, password })),
        (None, None) => Ok(None),
        _ => Err(anyhow!("{prefix}_USERNAME and {prefix}_PASSWORD must be set together")),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let defaults = ClinicDetails::default();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            database_url: non_empty("DATABASE_URL"),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            access_token_ttl: parse_or("ACCESS_TOKEN_TTL", 900)?, // default 15 min

            rate_login_per_min: parse_or("RATE_LOGIN_PER_MIN", 60)?,
            rate_protected_per_min: parse_or("RATE_PROTECTED_PER_MIN", 1000)?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            clinic: ClinicDetails {
                name: non_empty("CLINIC_NAME").unwrap_or(defaults.name),
                address: non_empty("CLINIC_ADDRESS").unwrap_or(defaults.address),
                phone: non_empty("CLINIC_PHONE").unwrap_or(defaults.phone),
            },
            receipt_cache_capacity: parse_or("RECEIPT_CACHE_CAPACITY", 1000)?,
            receipt_cache_ttl_secs: parse_or("RECEIPT_CACHE_TTL_SECS", 3600)?,

            bootstrap_admin: bootstrap_account("BOOTSTRAP_ADMIN")?,
            bootstrap_super_admin: bootstrap_account("BOOTSTRAP_SUPER_ADMIN")?,
        })
    }
}
