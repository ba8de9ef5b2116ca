use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{
    BillingStore, DUPLICATE_INVOICE, DUPLICATE_USERNAME, INVOICE_TOTAL_TOO_LARGE, OVERLAPPING_PERIOD,
};
use crate::{
    billing::max_money,
    error::{AppError, AppResult},
    model::{
        billing::{Billing, NewBilling},
        invoice::{Invoice, NewInvoice},
        pay_period::{NewPayPeriod, PayPeriod},
        role::Role,
        staff::{NewStaff, Staff},
        user::{NewUser, User},
    },
};

#[derive(Default)]
struct Tables {
    invoices: Vec<Invoice>,
    billings: Vec<Billing>,
    staff: Vec<Staff>,
    pay_periods: Vec<PayPeriod>,
    users: Vec<User>,
    next_invoice_id: u64,
    next_billing_id: u64,
    next_emp_id: u64,
    next_period_serial: u64,
    next_user_id: u64,
}

fn next_id(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

/// In-process store; every operation runs under one lock so each write is
/// all-or-nothing.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl BillingStore for MemoryStore {
    async fn create_invoice(&self, new: NewInvoice) -> AppResult<Invoice> {
        let mut t = self.lock()?;

        if t.invoices.iter().any(|i| i.inv_number == new.inv_number) {
            return Err(AppError::DuplicateKey(DUPLICATE_INVOICE.into()));
        }
        if !t.staff.iter().any(|s| s.emp_id == new.ref_emp_id) {
            return Err(AppError::NotFound("Doctor"));
        }
        if !t.pay_periods.iter().any(|p| p.period_serial == new.ref_period_serial) {
            return Err(AppError::NotFound("Pay period"));
        }

        let invoice = Invoice {
            inv_id: next_id(&mut t.next_invoice_id),
            inv_number: new.inv_number,
            inv_date: new.inv_date,
            paid_on: new.paid_on,
            ref_emp_id: new.ref_emp_id,
            ref_period_serial: new.ref_period_serial,
            gross_amount: Decimal::ZERO,
            facility_fees: None,
            gst: None,
            other_deduction: None,
            net_amount: Decimal::ZERO,
            pay_type: None,
        };
        t.invoices.push(invoice.clone());
        Ok(invoice)
    }

    async fn add_billing(&self, invoice_id: u64, new: NewBilling) -> AppResult<Billing> {
        let mut t = self.lock()?;

        let idx = t
            .invoices
            .iter()
            .position(|i| i.inv_id == invoice_id)
            .ok_or(AppError::NotFound("Invoice"))?;

        // checked before any state changes
        let gross_amount = t.invoices[idx]
            .gross_amount
            .checked_add(new.billing_amount)
            .filter(|total| *total <= max_money())
            .ok_or_else(|| AppError::Validation(INVOICE_TOTAL_TOO_LARGE.into()))?;

        let billing = Billing {
            billing_id: next_id(&mut t.next_billing_id),
            billing_date: new.billing_date,
            billing_type: new.billing_type,
            billing_ref: new.billing_ref,
            billing_amount: new.billing_amount,
            ref_inv_id: invoice_id,
        };
        t.invoices[idx].gross_amount = gross_amount;
        t.billings.push(billing.clone());
        Ok(billing)
    }

    async fn get_invoice(&self, invoice_id: u64) -> AppResult<Option<Invoice>> {
        let t = self.lock()?;
        Ok(t.invoices.iter().find(|i| i.inv_id == invoice_id).cloned())
    }

    async fn list_invoices(&self) -> AppResult<Vec<Invoice>> {
        Ok(self.lock()?.invoices.clone())
    }

    async fn billings_for_invoice(&self, invoice_id: u64) -> AppResult<Vec<Billing>> {
        let t = self.lock()?;
        Ok(t.billings
            .iter()
            .filter(|b| b.ref_inv_id == invoice_id)
            .cloned()
            .collect())
    }

    async fn list_billings(&self) -> AppResult<Vec<Billing>> {
        Ok(self.lock()?.billings.clone())
    }

    async fn get_staff(&self, emp_id: u64) -> AppResult<Option<Staff>> {
        let t = self.lock()?;
        Ok(t.staff.iter().find(|s| s.emp_id == emp_id).cloned())
    }

    async fn list_staff(&self) -> AppResult<Vec<Staff>> {
        Ok(self.lock()?.staff.clone())
    }

    async fn add_staff(&self, new: NewStaff) -> AppResult<Staff> {
        let mut t = self.lock()?;
        let staff = Staff {
            emp_id: next_id(&mut t.next_emp_id),
            first_name: new.first_name,
            last_name: new.last_name,
            abn: new.abn,
            facility_fees_percent: new.facility_fees_percent,
        };
        t.staff.push(staff.clone());
        Ok(staff)
    }

    async fn get_pay_period(&self, serial: u64) -> AppResult<Option<PayPeriod>> {
        let t = self.lock()?;
        Ok(t.pay_periods.iter().find(|p| p.period_serial == serial).cloned())
    }

    async fn list_pay_periods(&self) -> AppResult<Vec<PayPeriod>> {
        Ok(self.lock()?.pay_periods.clone())
    }

    async fn add_pay_period(&self, new: NewPayPeriod) -> AppResult<PayPeriod> {
        if new.start > new.end {
            return Err(AppError::Validation(
                "Start Date must not be after End Date".into(),
            ));
        }

        let mut t = self.lock()?;
        if t.pay_periods.iter().any(|p| p.overlaps(new.start, new.end)) {
            return Err(AppError::Conflict(OVERLAPPING_PERIOD.into()));
        }

        let period = PayPeriod {
            period_serial: next_id(&mut t.next_period_serial),
            period_start_date: new.start,
            period_end_date: new.end,
        };
        t.pay_periods.push(period.clone());
        Ok(period)
    }

    async fn find_user(&self, username: &str) -> AppResult<Option<User>> {
        let t = self.lock()?;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self, role: Role) -> AppResult<Vec<User>> {
        let t = self.lock()?;
        Ok(t.users.iter().filter(|u| u.role == role).cloned().collect())
    }

    async fn add_user(&self, new: NewUser) -> AppResult<User> {
        let mut t = self.lock()?;
        if t.users.iter().any(|u| u.username == new.username) {
            return Err(AppError::DuplicateKey(DUPLICATE_USERNAME.into()));
        }

        let user = User {
            id: next_id(&mut t.next_user_id),
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
        };
        t.users.push(user.clone());
        Ok(user)
    }
}
