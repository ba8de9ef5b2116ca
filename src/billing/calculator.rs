use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use utoipa::ToSchema;

/// Decimal places kept for presented money values.
pub const MONEY_SCALE: u32 = 2;

/// Largest value a stored money column (`DECIMAL(12,2)`) can hold.
pub fn max_money() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// Derived receipt amounts. Values are kept at full precision until
/// [`BillingTotals::rounded`] is called at the presentation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct BillingTotals {
    #[schema(value_type = String, example = "150.00")]
    pub total_billing: Decimal,
    #[schema(value_type = String, example = "15.00")]
    pub facility_fee_amount: Decimal,
    #[schema(value_type = String, example = "5.00")]
    pub gst_amount: Decimal,
    #[schema(value_type = String, example = "20.00")]
    pub total_deductions: Decimal,
    #[schema(value_type = String, example = "130.00")]
    pub net_payment: Decimal,
}

impl BillingTotals {
    pub fn rounded(&self) -> Self {
        Self {
            total_billing: round_money(self.total_billing),
            facility_fee_amount: round_money(self.facility_fee_amount),
            gst_amount: round_money(self.gst_amount),
            total_deductions: round_money(self.total_deductions),
            net_payment: round_money(self.net_payment),
        }
    }
}

pub fn compute_totals<I>(amounts: I, fee_percent: Decimal, stored_gst: Option<Decimal>) -> BillingTotals
where
    I: IntoIterator<Item = Decimal>,
{
    let total_billing: Decimal = amounts.into_iter().sum();
    let facility_fee_amount = fee_percent / Decimal::ONE_HUNDRED * total_billing;
    let gst_amount = stored_gst.unwrap_or(Decimal::ZERO);
    let total_deductions = facility_fee_amount + gst_amount;

    BillingTotals {
        total_billing,
        facility_fee_amount,
        gst_amount,
        total_deductions,
        net_payment: total_billing - total_deductions,
    }
}

/// Fee and GST figures shown when a doctor is picked on the invoice form.
/// GST is charged at 10% of the facility fee percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DoctorFees {
    #[schema(value_type = String, example = "35.00")]
    pub facility_fee: Decimal,
    #[schema(value_type = String, example = "3.50")]
    pub gst: Decimal,
}

pub fn doctor_fees(fee_percent: Decimal) -> DoctorFees {
    DoctorFees {
        facility_fee: fee_percent,
        gst: fee_percent * Decimal::new(1, 1),
    }
}

pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// `$1234.50` style rendering, negative values as `-$12.00`.
pub fn format_money(value: Decimal) -> String {
    let rounded = round_money(value);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${}", rounded.abs())
    } else {
        format!("${}", rounded.abs())
    }
}
