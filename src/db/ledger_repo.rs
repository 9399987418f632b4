// src/db/ledger_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::ledger::{Deposit, DepositStatus, Expense, ExternalPayment, PaymentStatus},
};

#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  DEPOSITS
    // =========================================================================

    pub async fn insert_deposit<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
        amount: Decimal,
        code: Option<&str>,
        note: Option<&str>,
    ) -> Result<Deposit, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let deposit = sqlx::query_as::<_, Deposit>(
            r#"
            INSERT INTO deposits (outlet_id, trading_date, amount, code, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(outlet_id)
        .bind(trading_date)
        .bind(amount)
        .bind(code)
        .bind(note)
        .fetch_one(executor)
        .await?;
        Ok(deposit)
    }

    /// Sum of claimed deposits excluding the ones an admin rejected.
    pub async fn verified_total(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<Decimal, AppError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM deposits
            WHERE outlet_id = $1 AND trading_date = $2 AND status <> 'INVALID'
            "#,
        )
        .bind(outlet_id)
        .bind(trading_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Administrative override, outside the attendant write path.
    pub async fn set_deposit_status(
        &self,
        deposit_id: Uuid,
        status: DepositStatus,
    ) -> Result<Deposit, AppError> {
        sqlx::query_as::<_, Deposit>(
            "UPDATE deposits SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(deposit_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::DepositNotFound)
    }

    // =========================================================================
    //  EXPENSES
    // =========================================================================

    pub async fn insert_expense<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (outlet_id, trading_date, amount, note)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(outlet_id)
        .bind(trading_date)
        .bind(amount)
        .bind(note)
        .fetch_one(executor)
        .await?;
        Ok(expense)
    }

    pub async fn get_expenses(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<Vec<Expense>, AppError> {
        let rows = sqlx::query_as::<_, Expense>(
            "SELECT * FROM expenses WHERE outlet_id = $1 AND trading_date = $2 ORDER BY created_at ASC",
        )
        .bind(outlet_id)
        .bind(trading_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    //  EXTERNAL PAYMENTS (till)
    // =========================================================================

    pub async fn insert_external_payment(
        &self,
        outlet_id: Uuid,
        amount: Decimal,
        status: PaymentStatus,
        reference: Option<&str>,
        paid_at: DateTime<Utc>,
    ) -> Result<ExternalPayment, AppError> {
        let payment = sqlx::query_as::<_, ExternalPayment>(
            r#"
            INSERT INTO external_payments (outlet_id, amount, status, reference, paid_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(outlet_id)
        .bind(amount)
        .bind(status)
        .bind(reference)
        .bind(paid_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(payment)
    }

    /// Gross till takings attributed to the current period: everything not
    /// failed since the window opened.
    pub async fn gross_payments_since(
        &self,
        outlet_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Decimal, AppError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM external_payments
            WHERE outlet_id = $1 AND paid_at >= $2 AND status <> 'FAILED'
            "#,
        )
        .bind(outlet_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
