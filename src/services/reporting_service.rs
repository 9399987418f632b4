// src/services/reporting_service.rs
//
// Read side of the engine: revenue aggregation, the carryover calculator and
// the header totals. Reads are not transactional with writes; a read racing
// a rotation sees either the pre- or post-rotation state, never a partial
// one, because the writer side is atomic.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LedgerRepository, PeriodRepository, PricingRepository, StockRepository},
    models::{
        outlet::Outlet,
        period::PeriodState,
        reporting::HeaderTotals,
    },
    services::compute::{self, ClosingLine, DayInputs, DayTotals},
};

#[derive(Clone)]
pub struct ReportingService {
    stock: StockRepository,
    ledger: LedgerRepository,
    pricing: PricingRepository,
    periods: PeriodRepository,
    pool: PgPool,
}

impl ReportingService {
    pub fn new(
        stock: StockRepository,
        ledger: LedgerRepository,
        pricing: PricingRepository,
        periods: PeriodRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            stock,
            ledger,
            pricing,
            periods,
            pool,
        }
    }

    // =========================================================================
    //  STOCK LEDGER READER
    // =========================================================================

    /// Effective opening per item: the day's opening rows, plus yesterday's
    /// live closing leftovers while yesterday is still OPEN. Once yesterday
    /// has been locked (rotated), its leftover was already folded into
    /// today's seeded opening rows and must not count twice.
    pub async fn opening_effective_in(
        &self,
        conn: &mut PgConnection,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<HashMap<String, Decimal>, AppError> {
        let openings = self
            .stock
            .get_openings_in(&mut *conn, outlet_id, trading_date)
            .await?;

        let mut effective: HashMap<String, Decimal> = HashMap::new();
        for row in openings {
            *effective.entry(row.item_key).or_insert(Decimal::ZERO) += row.quantity;
        }

        if let Some(prev) = trading_date.pred_opt() {
            let prev_state = self.periods.get_state_in(&mut *conn, outlet_id, prev).await?;
            if prev_state == PeriodState::Open {
                for row in self.stock.get_closings_in(&mut *conn, outlet_id, prev).await? {
                    *effective.entry(row.item_key).or_insert(Decimal::ZERO) += row.closing_qty;
                }
            }
        }

        Ok(effective)
    }

    pub async fn opening_effective(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<HashMap<String, Decimal>, AppError> {
        let mut conn = self.pool.acquire().await?;
        self.opening_effective_in(&mut conn, outlet_id, trading_date)
            .await
    }

    // =========================================================================
    //  PRICE RESOLVER
    // =========================================================================

    pub async fn resolved_prices(
        &self,
        outlet_id: Uuid,
    ) -> Result<HashMap<String, Decimal>, AppError> {
        let rows = self.pricing.get_outlet_prices(outlet_id).await?;
        let items = self.pricing.get_all_items().await?;
        Ok(compute::resolve_prices(&rows, &items))
    }

    // =========================================================================
    //  REVENUE AGGREGATOR
    // =========================================================================

    pub async fn day_inputs_live(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<DayInputs, AppError> {
        let opening_effective = self.opening_effective(outlet_id, trading_date).await?;
        let closings: Vec<ClosingLine> = self
            .stock
            .get_closings(outlet_id, trading_date)
            .await?
            .into_iter()
            .map(|row| ClosingLine {
                item_key: row.item_key,
                closing_qty: row.closing_qty,
                waste_qty: row.waste_qty,
            })
            .collect();
        let prices = self.resolved_prices(outlet_id).await?;
        let expenses_total = self
            .ledger
            .get_expenses(outlet_id, trading_date)
            .await?
            .iter()
            .fold(Decimal::ZERO, |acc, e| acc + e.amount);
        let verified_deposits = self.ledger.verified_total(outlet_id, trading_date).await?;

        Ok(DayInputs {
            opening_effective,
            closings,
            prices,
            expenses_total,
            verified_deposits,
        })
    }

    pub async fn day_totals_live(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<DayTotals, AppError> {
        let inputs = self.day_inputs_live(outlet_id, trading_date).await?;
        Ok(compute::day_totals(&inputs))
    }

    // =========================================================================
    //  CARRYOVER CALCULATOR
    // =========================================================================

    /// Signed outstanding balance from the day before `trading_date`.
    /// Prefers live rows; falls back to the latest period snapshot once a
    /// rotation has cleared them; zero when the outlet has no history.
    pub async fn carryover(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<Decimal, AppError> {
        let Some(prev) = trading_date.pred_opt() else {
            return Ok(Decimal::ZERO);
        };

        let live_closings = self.stock.get_closings(outlet_id, prev).await?;
        if !live_closings.is_empty() {
            let totals = self.day_totals_live(outlet_id, prev).await?;
            return Ok(compute::outstanding(&totals));
        }

        if let Some(snapshot) = self.periods.latest_snapshot(outlet_id, prev).await? {
            tracing::debug!(
                "carryover for outlet {} on {} served from snapshot seq {}",
                outlet_id,
                prev,
                snapshot.sequence
            );
            let verified_deposits = self.ledger.verified_total(outlet_id, prev).await?;
            let inputs = compute::day_inputs_from_snapshot(&snapshot.body.0, verified_deposits);
            let totals = compute::day_totals(&inputs);
            return Ok(compute::outstanding(&totals));
        }

        // New outlet, no history at all.
        Ok(Decimal::ZERO)
    }

    // =========================================================================
    //  HEADER TOTALS
    // =========================================================================

    pub async fn header_totals(
        &self,
        outlet: &Outlet,
        trading_date: NaiveDate,
    ) -> Result<HeaderTotals, AppError> {
        let carryover_prev = self.carryover(outlet.id, trading_date).await?;
        let totals = self.day_totals_live(outlet.id, trading_date).await?;
        let till_sales_gross = self.till_sales_gross(outlet.id, trading_date).await?;

        let amount_to_deposit = compute::amount_to_deposit(
            carryover_prev,
            &totals,
            till_sales_gross,
            outlet.uses_till_netting,
        );

        Ok(HeaderTotals {
            trading_date,
            weight_sales: totals.weight_sales,
            expenses: totals.expenses,
            waste_value: totals.waste_value,
            verified_deposits: totals.verified_deposits,
            till_sales_gross,
            carryover_prev,
            amount_to_deposit,
            warnings: totals.warnings.iter().map(|w| w.to_string()).collect(),
        })
    }

    /// Gross till payments inside the current period window. Without an
    /// active period pointer the window defaults to the start of the
    /// trading date.
    pub async fn till_sales_gross(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<Decimal, AppError> {
        let since = match self.periods.get_active_period(outlet_id).await? {
            Some(period) => period.period_start_at,
            None => trading_date.and_time(NaiveTime::MIN).and_utc(),
        };
        self.ledger.gross_payments_since(outlet_id, since).await
    }
}
