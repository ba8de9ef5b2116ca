//! Receipt view model shared by the on-screen view and the PDF download.

pub mod cache;
pub mod pdf;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    billing::{BillingTotals, compute_totals, round_money},
    config::ClinicDetails,
    model::{billing::Billing, invoice::Invoice, pay_period::PayPeriod, staff::Staff},
};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ClinicHeader {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl From<&ClinicDetails> for ClinicHeader {
    fn from(c: &ClinicDetails) -> Self {
        Self {
            name: c.name.clone(),
            address: c.address.clone(),
            phone: c.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReceiptInvoice {
    pub id: u64,
    pub number: String,
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub paid_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReceiptDoctor {
    pub name: String,
    pub abn: String,
    #[schema(value_type = String)]
    pub facility_fee_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReceiptPeriod {
    #[schema(value_type = String, format = "date")]
    pub start: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReceiptLine {
    #[schema(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    pub billing_type: String,
    pub reference: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Receipt {
    pub clinic: ClinicHeader,
    pub invoice: ReceiptInvoice,
    pub doctor: Option<ReceiptDoctor>,
    pub pay_period: Option<ReceiptPeriod>,
    pub billings: Vec<ReceiptLine>,
    /// Rounded to cents.
    pub totals: BillingTotals,
}

impl Receipt {
    /// Totals are derived from the billing rows themselves, not from the
    /// invoice's stored gross amount. An unknown doctor means no facility fee.
    pub fn build(
        clinic: &ClinicDetails,
        invoice: &Invoice,
        doctor: Option<&Staff>,
        pay_period: Option<&PayPeriod>,
        billings: &[Billing],
    ) -> Self {
        let fee_percent = doctor.map_or(Decimal::ZERO, |d| d.facility_fees_percent);
        let totals = compute_totals(
            billings.iter().map(|b| b.billing_amount),
            fee_percent,
            invoice.gst,
        );

        Self {
            clinic: clinic.into(),
            invoice: ReceiptInvoice {
                id: invoice.inv_id,
                number: invoice.inv_number.clone(),
                date: invoice.inv_date,
                paid_on: invoice.paid_on,
            },
            doctor: doctor.map(|d| ReceiptDoctor {
                name: d.full_name(),
                abn: d.abn.clone(),
                facility_fee_percent: d.facility_fees_percent,
            }),
            pay_period: pay_period.map(|p| ReceiptPeriod {
                start: p.period_start_date,
                end: p.period_end_date,
            }),
            billings: billings
                .iter()
                .map(|b| ReceiptLine {
                    date: b.billing_date,
                    billing_type: b.billing_type.clone(),
                    reference: b.billing_ref.clone(),
                    amount: round_money(b.billing_amount),
                })
                .collect(),
            totals: totals.rounded(),
        }
    }

    pub fn file_name(&self) -> String {
        file_name(self.invoice.id)
    }
}

pub fn file_name(invoice_id: u64) -> String {
    format!("receipt_{invoice_id}.pdf")
}
