use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// User-visible message attached to a response, mirroring a web flash.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Flash {
    pub category: &'static str,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { category: "success", message: message.into() }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self { category: "danger", message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { category: "warning", message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { category: "info", message: message.into() }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("authentication required")]
    Unauthenticated { login_path: &'static str },

    #[error("unauthorized access")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    DuplicateKey(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("pdf rendering failed: {0}")]
    Pdf(String),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("password hashing failed: {0}")]
    Password(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

pub const GENERIC_FAILURE: &str = "An unexpected error occurred. Please try again.";

impl AppError {
    fn flash(&self) -> Flash {
        match self {
            AppError::Validation(msg)
            | AppError::InvalidCredentials(msg)
            | AppError::DuplicateKey(msg)
            | AppError::Conflict(msg) => Flash::danger(msg.clone()),
            AppError::Unauthenticated { .. } => {
                Flash::info("Please log in to access this page.")
            }
            AppError::Forbidden => Flash::danger("Unauthorized access!"),
            AppError::NotFound(what) => Flash::danger(format!("{what} not found")),
            _ => Flash::danger(GENERIC_FAILURE),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    flash: Flash,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
            AppError::Unauthenticated { .. } | AppError::Forbidden => StatusCode::SEE_OTHER,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateKey(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let flash = self.flash();

        if status.is_server_error() {
            // detail stays in the log, the caller only sees the generic message
            error!(error = %self, "Request failed");
        }

        let location = match self {
            AppError::Unauthenticated { login_path } => Some(*login_path),
            AppError::Forbidden => Some("/"),
            _ => None,
        };

        let mut builder = HttpResponse::build(status);
        if let Some(location) = location {
            builder.insert_header((header::LOCATION, location));
        }

        let error = if status.is_server_error() {
            GENERIC_FAILURE.to_string()
        } else {
            self.to_string()
        };

        builder.json(ErrorBody { error, flash })
    }
}

/// MySQL reports unique violations with SQLSTATE 23000.
pub fn is_duplicate_key(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23000"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn forbidden_redirects_home_with_flash() {
        let resp = AppError::Forbidden.error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["flash"]["message"], "Unauthorized access!");
        assert_eq!(json["flash"]["category"], "danger");
    }

    #[actix_web::test]
    async fn internal_errors_hide_details() {
        let resp = AppError::Internal("pool exhausted on shard 3".into()).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("shard 3"));
        assert!(text.contains(GENERIC_FAILURE));
    }

    #[test]
    fn unauthenticated_points_at_login() {
        let resp = AppError::Unauthenticated { login_path: "/super_admin_login" }.error_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            resp.headers().get(header::LOCATION).unwrap(),
            "/super_admin_login"
        );
    }
}
