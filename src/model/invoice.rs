use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Invoice {
    #[schema(example = 1)]
    pub inv_id: u64,

    #[schema(example = "INV-2026-0001")]
    pub inv_number: String,

    #[schema(example = "2026-01-15", value_type = Option<String>, format = "date")]
    pub inv_date: Option<NaiveDate>,

    #[schema(example = "2026-01-20", value_type = Option<String>, format = "date")]
    pub paid_on: Option<NaiveDate>,

    #[schema(example = 1)]
    pub ref_emp_id: u64,

    #[schema(example = 1)]
    pub ref_period_serial: u64,

    /// Running total of the invoice's billings.
    #[schema(example = "150.00", value_type = String)]
    pub gross_amount: Decimal,

    #[schema(value_type = Option<String>)]
    pub facility_fees: Option<Decimal>,

    #[schema(value_type = Option<String>)]
    pub gst: Option<Decimal>,

    #[schema(value_type = Option<String>)]
    pub other_deduction: Option<Decimal>,

    #[schema(example = "0.00", value_type = String)]
    pub net_amount: Decimal,

    pub pay_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub inv_number: String,
    pub inv_date: Option<NaiveDate>,
    pub paid_on: Option<NaiveDate>,
    pub ref_emp_id: u64,
    pub ref_period_serial: u64,
}

/// Column width of `invoices.inv_number`.
pub const INV_NUMBER_MAX_LEN: usize = 64;

pub const COLUMNS: &[&str] = &[
    "inv_id",
    "inv_number",
    "inv_date",
    "paid_on",
    "ref_emp_id",
    "ref_period_serial",
    "gross_amount",
    "facility_fees",
    "gst",
    "other_deduction",
    "net_amount",
    "pay_type",
];
