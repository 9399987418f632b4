// src/services/ledger_service.rs
//
// Cash side of the engine: deposits, expenses and the payment facts the
// mobile-money webhook pushes in.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, retry::with_retry},
    db::{LedgerRepository, PeriodRepository},
    models::{
        ledger::{Deposit, DepositStatus, Expense, ExternalPayment, PaymentStatus},
        outlet::Outlet,
    },
    services::period_service::PeriodService,
};

#[derive(Clone)]
pub struct LedgerService {
    ledger: LedgerRepository,
    periods: PeriodRepository,
    period: PeriodService,
    pool: PgPool,
}

impl LedgerService {
    pub fn new(
        ledger: LedgerRepository,
        periods: PeriodRepository,
        period: PeriodService,
        pool: PgPool,
    ) -> Self {
        Self {
            ledger,
            periods,
            period,
            pool,
        }
    }

    /// Posts a claimed deposit. Always succeeds while the period is OPEN;
    /// there is deliberately no uniqueness on the reference code.
    pub async fn post_deposit(
        &self,
        outlet: &Outlet,
        trading_date: NaiveDate,
        amount: Decimal,
        code: Option<&str>,
        note: Option<&str>,
    ) -> Result<Deposit, AppError> {
        with_retry("post-deposit", || async {
            let mut tx = self.pool.begin().await?;
            self.period.assert_open(&mut tx, outlet, trading_date).await?;
            let deposit = self
                .ledger
                .insert_deposit(&mut *tx, outlet.id, trading_date, amount, code, note)
                .await?;
            tx.commit().await?;
            Ok(deposit)
        })
        .await
    }

    pub async fn post_expense(
        &self,
        outlet: &Outlet,
        trading_date: NaiveDate,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<Expense, AppError> {
        with_retry("post-expense", || async {
            let mut tx = self.pool.begin().await?;
            self.period.assert_open(&mut tx, outlet, trading_date).await?;
            let expense = self
                .ledger
                .insert_expense(&mut *tx, outlet.id, trading_date, amount, note)
                .await?;
            tx.commit().await?;
            Ok(expense)
        })
        .await
    }

    /// Administrative verification override. Downstream recomputation is the
    /// consumer's concern; the totals always re-derive from the stored rows.
    pub async fn set_deposit_status(
        &self,
        deposit_id: Uuid,
        status: DepositStatus,
    ) -> Result<Deposit, AppError> {
        let deposit = self.ledger.set_deposit_status(deposit_id, status).await?;
        tracing::info!(
            "deposit {} for outlet {} set to {:?}",
            deposit.id,
            deposit.outlet_id,
            deposit.status
        );
        Ok(deposit)
    }

    /// Stores a payment fact from the provider webhook. Returns whether the
    /// payment falls inside the outlet's current trading window; out-of-window
    /// facts are kept for audit but ignored for today's till.
    pub async fn record_external_payment(
        &self,
        outlet_id: Uuid,
        amount: Decimal,
        status: PaymentStatus,
        reference: Option<&str>,
        paid_at: DateTime<Utc>,
    ) -> Result<(ExternalPayment, bool), AppError> {
        let payment = self
            .ledger
            .insert_external_payment(outlet_id, amount, status, reference, paid_at)
            .await?;

        let attributed = match self.periods.get_active_period(outlet_id).await? {
            Some(period) => paid_at >= period.period_start_at,
            // Outlet never rotated: no window to exclude it from.
            None => true,
        };

        if !attributed {
            tracing::debug!(
                "payment {} for outlet {} predates the active period; excluded from the till",
                payment.id,
                outlet_id
            );
        }

        Ok((payment, attributed))
    }
}
