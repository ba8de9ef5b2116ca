use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "emp_id": 1,
        "first_name": "Jane",
        "last_name": "Citizen",
        "abn": "51 824 753 556",
        "facility_fees_percent": "35.00"
    })
)]
pub struct Staff {
    #[schema(example = 1)]
    pub emp_id: u64,

    #[schema(example = "Jane")]
    pub first_name: String,

    #[schema(example = "Citizen")]
    pub last_name: String,

    #[schema(example = "51 824 753 556")]
    pub abn: String,

    #[schema(example = "35.00", value_type = String)]
    pub facility_fees_percent: Decimal,
}

impl Staff {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone)]
pub struct NewStaff {
    pub first_name: String,
    pub last_name: String,
    pub abn: String,
    pub facility_fees_percent: Decimal,
}

pub const NAME_MAX_LEN: usize = 100;
pub const ABN_MAX_LEN: usize = 32;

pub const COLUMNS: &[&str] = &[
    "emp_id",
    "first_name",
    "last_name",
    "abn",
    "facility_fees_percent",
];
