use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Billing {
    #[schema(example = 1)]
    pub billing_id: u64,

    #[schema(example = "2026-01-03", value_type = Option<String>, format = "date")]
    pub billing_date: Option<NaiveDate>,

    #[schema(example = "Medicare")]
    pub billing_type: String,

    #[schema(example = "MC-88213")]
    pub billing_ref: String,

    #[schema(example = "100.00", value_type = String)]
    pub billing_amount: Decimal,

    #[schema(example = 1)]
    pub ref_inv_id: u64,
}

#[derive(Debug, Clone)]
pub struct NewBilling {
    pub billing_date: Option<NaiveDate>,
    pub billing_type: String,
    pub billing_ref: String,
    pub billing_amount: Decimal,
}

pub const BILLING_TYPE_MAX_LEN: usize = 64;
pub const BILLING_REF_MAX_LEN: usize = 128;

pub const COLUMNS: &[&str] = &[
    "billing_id",
    "billing_date",
    "billing_type",
    "billing_ref",
    "billing_amount",
    "ref_inv_id",
];
