pub mod calculator;

pub use calculator::{BillingTotals, DoctorFees, compute_totals, doctor_fees, format_money, max_money, round_money};
