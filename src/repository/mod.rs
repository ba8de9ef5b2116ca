//! Persistence seam for invoices, billings, staff, pay periods and accounts.
//!
//! [`MySqlStore`] is the production backend. [`MemoryStore`] keeps the same
//! rules in process and is used when no database is configured.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    model::{
        billing::{Billing, NewBilling},
        invoice::{Invoice, NewInvoice},
        pay_period::{NewPayPeriod, PayPeriod},
        role::Role,
        staff::{NewStaff, Staff},
        user::{NewUser, User},
    },
};

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

pub const DUPLICATE_INVOICE: &str =
    "Invoice number already exists. Please use a unique invoice number.";
pub const OVERLAPPING_PERIOD: &str =
    "Pay period overlaps an existing date range. Please enter a valid date range.";
pub const DUPLICATE_USERNAME: &str = "Username already exists";
pub const INVOICE_TOTAL_TOO_LARGE: &str =
    "Invoice total would exceed the maximum amount of 9999999999.99";

#[async_trait]
pub trait BillingStore: Send + Sync {
    /// Fails with `DuplicateKey` when the number is taken and `NotFound`
    /// when the doctor or pay period does not exist.
    async fn create_invoice(&self, new: NewInvoice) -> AppResult<Invoice>;

    /// Inserts the billing and bumps the invoice's gross amount in one
    /// atomic step. Fails with `Validation`, leaving the invoice untouched,
    /// when the new gross amount would not fit a money column.
    async fn add_billing(&self, invoice_id: u64, new: NewBilling) -> AppResult<Billing>;

    async fn get_invoice(&self, invoice_id: u64) -> AppResult<Option<Invoice>>;
    async fn list_invoices(&self) -> AppResult<Vec<Invoice>>;
    async fn billings_for_invoice(&self, invoice_id: u64) -> AppResult<Vec<Billing>>;
    async fn list_billings(&self) -> AppResult<Vec<Billing>>;

    async fn get_staff(&self, emp_id: u64) -> AppResult<Option<Staff>>;
    async fn list_staff(&self) -> AppResult<Vec<Staff>>;
    async fn add_staff(&self, new: NewStaff) -> AppResult<Staff>;

    async fn get_pay_period(&self, serial: u64) -> AppResult<Option<PayPeriod>>;
    async fn list_pay_periods(&self) -> AppResult<Vec<PayPeriod>>;
    /// Fails with `Conflict` when the range overlaps an existing period.
    async fn add_pay_period(&self, new: NewPayPeriod) -> AppResult<PayPeriod>;

    async fn find_user(&self, username: &str) -> AppResult<Option<User>>;
    async fn list_users(&self, role: Role) -> AppResult<Vec<User>>;
    async fn add_user(&self, new: NewUser) -> AppResult<User>;
}
