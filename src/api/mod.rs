pub mod doctor;
pub mod home;
pub mod invoice;
pub mod receipt;
pub mod settings;

use actix_web::{HttpResponse, http::header, web};
use rust_decimal::Decimal;
use serde::{Serialize, de::DeserializeOwned};

use crate::billing::{calculator::MONEY_SCALE, max_money};
use crate::error::{AppError, AppResult};

/// 303 to `location`, carrying `body` for API clients.
pub(crate) fn see_other(location: impl Into<String>, body: impl Serialize) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location.into()))
        .json(body)
}

/// Decodes a JSON request body. Handlers take the raw bytes and call this
/// only after the session check, so anonymous callers are redirected to
/// login whatever they posted.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &web::Bytes) -> AppResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Invalid request body: {e}")))
}

/// Trimmed, non-empty form text.
pub(crate) fn required(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Rejects text wider than its column, counted in characters.
pub(crate) fn check_len(field: &str, value: String, max: usize) -> AppResult<String> {
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value)
}

/// Stored money carries cents at most; finer inputs are refused rather than
/// silently rounded.
pub(crate) fn check_scale(field: &str, value: Decimal) -> AppResult<Decimal> {
    if value.normalize().scale() > MONEY_SCALE {
        return Err(AppError::Validation(format!(
            "{field} must have at most {MONEY_SCALE} decimal places"
        )));
    }
    Ok(value)
}

/// Non-negative, whole cents and within the money column.
pub(crate) fn check_amount(field: &str, value: Decimal) -> AppResult<Decimal> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::Validation(format!("{field} must not be negative")));
    }
    if value > max_money() {
        return Err(AppError::Validation(format!(
            "{field} must not exceed {}",
            max_money()
        )));
    }
    check_scale(field, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde::Deserialize;

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(required(Some("  INV-1 ".into())).as_deref(), Some("INV-1"));
        assert_eq!(required(Some("   ".into())), None);
        assert_eq!(required(None), None);
    }

    #[test]
    fn scale_check_allows_trailing_zeros() {
        assert!(check_scale("amount", dec!(10.50)).is_ok());
        assert!(check_scale("amount", dec!(10.5000)).is_ok());
        assert!(check_scale("amount", dec!(10.505)).is_err());
    }

    #[test]
    fn amount_bounds() {
        assert!(check_amount("amount", dec!(0)).is_ok());
        assert!(check_amount("amount", dec!(9999999999.99)).is_ok());
        assert!(check_amount("amount", dec!(10000000000.00)).is_err());
        assert!(check_amount("amount", Decimal::MAX).is_err());
        assert!(check_amount("amount", dec!(-0.01)).is_err());
    }

    #[test]
    fn length_is_counted_in_characters() {
        assert!(check_len("abn", "é".repeat(32), 32).is_ok());
        let err = check_len("abn", "1".repeat(33), 32).unwrap_err();
        assert_eq!(err.to_string(), "abn must be at most 32 characters");
    }

    #[derive(Debug, Deserialize)]
    struct Body {
        name: String,
    }

    #[test]
    fn malformed_body_is_a_validation_error() {
        let ok: Body = parse_body(&web::Bytes::from_static(br#"{"name":"x"}"#)).unwrap();
        assert_eq!(ok.name, "x");
        let err = parse_body::<Body>(&web::Bytes::from_static(b"{not json")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
