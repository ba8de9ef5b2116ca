use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayPeriod {
    #[schema(example = 1)]
    pub period_serial: u64,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub period_start_date: NaiveDate,

    #[schema(example = "2026-01-14", value_type = String, format = "date")]
    pub period_end_date: NaiveDate,
}

impl PayPeriod {
    /// Closed-interval overlap: sharing a single day counts.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.period_end_date && self.period_start_date <= end
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NewPayPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub const COLUMNS: &[&str] = &["period_serial", "period_start_date", "period_end_date"];
