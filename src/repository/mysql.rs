use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::MySqlPool;
use tracing::{debug, info, instrument};

use super::{
    BillingStore, DUPLICATE_INVOICE, DUPLICATE_USERNAME, INVOICE_TOTAL_TOO_LARGE, OVERLAPPING_PERIOD,
};
use crate::{
    billing::max_money,
    error::{AppError, AppResult, is_duplicate_key},
    model::{
        billing::{Billing, NewBilling},
        invoice::{Invoice, NewInvoice},
        pay_period::{NewPayPeriod, PayPeriod},
        role::Role,
        staff::{NewStaff, Staff},
        user::{NewUser, User, UserRow},
    },
};

const INVOICE_COLUMNS: &str = r#"
    inv_id, inv_number, inv_date, paid_on, ref_emp_id, ref_period_serial,
    gross_amount, facility_fees, gst, other_deduction, net_amount, pay_type
"#;

const BILLING_COLUMNS: &str =
    "billing_id, billing_date, billing_type, billing_ref, billing_amount, ref_inv_id";

const STAFF_COLUMNS: &str = "emp_id, first_name, last_name, abn, facility_fees_percent";

const PERIOD_COLUMNS: &str = "period_serial, period_start_date, period_end_date";

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn into_user(row: UserRow) -> AppResult<User> {
    User::try_from(row).map_err(AppError::Internal)
}

#[async_trait]
impl BillingStore for MySqlStore {
    #[instrument(skip(self, new), fields(inv_number = %new.inv_number))]
    async fn create_invoice(&self, new: NewInvoice) -> AppResult<Invoice> {
        let mut tx = self.pool.begin().await?;

        let doctors = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM staff WHERE emp_id = ?")
            .bind(new.ref_emp_id)
            .fetch_one(&mut *tx)
            .await?;
        if doctors == 0 {
            return Err(AppError::NotFound("Doctor"));
        }

        let periods = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pay_periods WHERE period_serial = ?",
        )
        .bind(new.ref_period_serial)
        .fetch_one(&mut *tx)
        .await?;
        if periods == 0 {
            return Err(AppError::NotFound("Pay period"));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO invoices
            (inv_number, inv_date, paid_on, ref_emp_id, ref_period_serial, gross_amount, net_amount)
            VALUES (?, ?, ?, ?, ?, 0, 0)
            "#,
        )
        .bind(&new.inv_number)
        .bind(new.inv_date)
        .bind(new.paid_on)
        .bind(new.ref_emp_id)
        .bind(new.ref_period_serial)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::DuplicateKey(DUPLICATE_INVOICE.into())
            } else {
                AppError::Database(e)
            }
        })?;

        let inv_id = result.last_insert_id();
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE inv_id = ?"
        ))
        .bind(inv_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(inv_id, "Invoice created");
        Ok(invoice)
    }

    #[instrument(skip(self, new), fields(amount = %new.billing_amount))]
    async fn add_billing(&self, invoice_id: u64, new: NewBilling) -> AppResult<Billing> {
        let mut tx = self.pool.begin().await?;

        // row lock serialises concurrent additions to the same invoice
        let gross = sqlx::query_scalar::<_, Decimal>(
            "SELECT gross_amount FROM invoices WHERE inv_id = ? FOR UPDATE",
        )
        .bind(invoice_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Invoice"))?;

        let fits = gross
            .checked_add(new.billing_amount)
            .is_some_and(|total| total <= max_money());
        if !fits {
            return Err(AppError::Validation(INVOICE_TOTAL_TOO_LARGE.into()));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO billings
            (billing_date, billing_type, billing_ref, billing_amount, ref_inv_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.billing_date)
        .bind(&new.billing_type)
        .bind(&new.billing_ref)
        .bind(new.billing_amount)
        .bind(invoice_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE invoices SET gross_amount = gross_amount + ? WHERE inv_id = ?")
            .bind(new.billing_amount)
            .bind(invoice_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let billing_id = result.last_insert_id();
        debug!(billing_id, invoice_id, "Billing added");

        Ok(Billing {
            billing_id,
            billing_date: new.billing_date,
            billing_type: new.billing_type,
            billing_ref: new.billing_ref,
            billing_amount: new.billing_amount,
            ref_inv_id: invoice_id,
        })
    }

    async fn get_invoice(&self, invoice_id: u64) -> AppResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE inv_id = ?"
        ))
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(invoice)
    }

    async fn list_invoices(&self) -> AppResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY inv_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(invoices)
    }

    async fn billings_for_invoice(&self, invoice_id: u64) -> AppResult<Vec<Billing>> {
        let billings = sqlx::query_as::<_, Billing>(&format!(
            "SELECT {BILLING_COLUMNS} FROM billings WHERE ref_inv_id = ? ORDER BY billing_id"
        ))
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(billings)
    }

    async fn list_billings(&self) -> AppResult<Vec<Billing>> {
        let billings = sqlx::query_as::<_, Billing>(&format!(
            "SELECT {BILLING_COLUMNS} FROM billings ORDER BY billing_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(billings)
    }

    async fn get_staff(&self, emp_id: u64) -> AppResult<Option<Staff>> {
        let staff = sqlx::query_as::<_, Staff>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff WHERE emp_id = ?"
        ))
        .bind(emp_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(staff)
    }

    async fn list_staff(&self) -> AppResult<Vec<Staff>> {
        let staff = sqlx::query_as::<_, Staff>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff ORDER BY emp_id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(staff)
    }

    #[instrument(skip(self, new))]
    async fn add_staff(&self, new: NewStaff) -> AppResult<Staff> {
        let result = sqlx::query(
            r#"
            INSERT INTO staff (first_name, last_name, abn, facility_fees_percent)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.abn)
        .bind(new.facility_fees_percent)
        .execute(&self.pool)
        .await?;

        let emp_id = result.last_insert_id();
        info!(emp_id, "Staff added");

        Ok(Staff {
            emp_id,
            first_name: new.first_name,
            last_name: new.last_name,
            abn: new.abn,
            facility_fees_percent: new.facility_fees_percent,
        })
    }

    async fn get_pay_period(&self, serial: u64) -> AppResult<Option<PayPeriod>> {
        let period = sqlx::query_as::<_, PayPeriod>(&format!(
            "SELECT {PERIOD_COLUMNS} FROM pay_periods WHERE period_serial = ?"
        ))
        .bind(serial)
        .fetch_optional(&self.pool)
        .await?;
        Ok(period)
    }

    async fn list_pay_periods(&self) -> AppResult<Vec<PayPeriod>> {
        let periods = sqlx::query_as::<_, PayPeriod>(&format!(
            "SELECT {PERIOD_COLUMNS} FROM pay_periods ORDER BY period_start_date"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(periods)
    }

    #[instrument(skip(self), fields(start = %new.start, end = %new.end))]
    async fn add_pay_period(&self, new: NewPayPeriod) -> AppResult<PayPeriod> {
        if new.start > new.end {
            return Err(AppError::Validation(
                "Start Date must not be after End Date".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        // locking read so two overlapping inserts cannot both pass the check
        let overlapping = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM pay_periods
            WHERE period_start_date <= ? AND period_end_date >= ?
            FOR UPDATE
            "#,
        )
        .bind(new.end)
        .bind(new.start)
        .fetch_one(&mut *tx)
        .await?;
        if overlapping > 0 {
            return Err(AppError::Conflict(OVERLAPPING_PERIOD.into()));
        }

        let result = sqlx::query(
            "INSERT INTO pay_periods (period_start_date, period_end_date) VALUES (?, ?)",
        )
        .bind(new.start)
        .bind(new.end)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let period_serial = result.last_insert_id();
        info!(period_serial, "Pay period added");

        Ok(PayPeriod {
            period_serial,
            period_start_date: new.start,
            period_end_date: new.end,
        })
    }

    async fn find_user(&self, username: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, role FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_user).transpose()
    }

    async fn list_users(&self, role: Role) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, role FROM users WHERE role = ? ORDER BY id",
        )
        .bind(role.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(into_user).collect()
    }

    #[instrument(skip(self, new), fields(username = %new.username, role = %new.role))]
    async fn add_user(&self, new: NewUser) -> AppResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, role) VALUES (?, ?, ?)",
        )
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(new.role.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::DuplicateKey(DUPLICATE_USERNAME.into())
            } else {
                AppError::Database(e)
            }
        })?;

        Ok(User {
            id: result.last_insert_id(),
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
        })
    }
}
