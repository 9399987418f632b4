// src/services/period_service.rs
//
// Period lifecycle: the OPEN -> LOCKED transition and the end-of-day
// rotation. Rotation is the only operation that spans two dates, so it holds
// the widest transaction and is the one write wrapped in the transient-retry
// helper as a whole.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::{error::AppError, retry::with_retry},
    db::{LedgerRepository, PeriodRepository, PricingRepository, StockRepository},
    models::{
        outlet::Outlet,
        period::{PeriodLock, PeriodSnapshot, PeriodState, SnapshotBody, SnapshotClosingLine, SnapshotExpenseLine},
        pricing::PriceUpdate,
        reporting::RotationOutcome,
    },
    services::{compute, compute::ClosingLine, reporting_service::ReportingService},
};

#[derive(Clone)]
pub struct PeriodService {
    periods: PeriodRepository,
    stock: StockRepository,
    ledger: LedgerRepository,
    pricing: PricingRepository,
    reporting: ReportingService,
    pool: PgPool,
}

impl PeriodService {
    pub fn new(
        periods: PeriodRepository,
        stock: StockRepository,
        ledger: LedgerRepository,
        pricing: PricingRepository,
        reporting: ReportingService,
        pool: PgPool,
    ) -> Self {
        Self {
            periods,
            stock,
            ledger,
            pricing,
            reporting,
            pool,
        }
    }

    // =========================================================================
    //  LOCK MANAGER
    // =========================================================================

    /// Guard for every mutating write. Must run inside the caller's
    /// transaction: the FOR UPDATE read pins the lock row so a concurrent
    /// lock transition cannot land between this check and the write.
    pub async fn assert_open(
        &self,
        conn: &mut PgConnection,
        outlet: &Outlet,
        trading_date: NaiveDate,
    ) -> Result<(), AppError> {
        self.periods
            .ensure_lock_row(&mut *conn, outlet.id, trading_date)
            .await?;
        if self
            .periods
            .locked_for_update(&mut *conn, outlet.id, trading_date)
            .await?
        {
            return Err(AppError::PeriodLocked {
                outlet: outlet.name.clone(),
                date: trading_date,
            });
        }
        Ok(())
    }

    pub async fn state(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<PeriodState, AppError> {
        self.periods.get_state(outlet_id, trading_date).await
    }

    /// OPEN -> LOCKED. Idempotent: re-locking an already locked day is a
    /// successful no-op that keeps the original timestamp and reason.
    pub async fn lock(
        &self,
        outlet: &Outlet,
        trading_date: NaiveDate,
        reason: &str,
    ) -> Result<PeriodLock, AppError> {
        let mut tx = self.pool.begin().await?;
        self.periods
            .ensure_lock_row(&mut *tx, outlet.id, trading_date)
            .await?;
        self.periods
            .mark_locked(&mut *tx, outlet.id, trading_date, reason)
            .await?;
        let lock = self.periods.get_lock(&mut *tx, outlet.id, trading_date).await?;
        tx.commit().await?;

        tracing::info!(
            "period {} locked for outlet {} (reason: {})",
            trading_date,
            outlet.code,
            reason
        );
        Ok(lock)
    }

    // =========================================================================
    //  ROTATION ORCHESTRATOR
    // =========================================================================

    /// End-of-day roll: seeds tomorrow's opening stock, applies the new
    /// price snapshot, resets the till attribution window, snapshots today
    /// and locks it. The seeding transaction is all-or-nothing and safe to
    /// re-run; the snapshot write is best-effort and must never block the
    /// lock.
    pub async fn rotate(
        &self,
        outlet: &Outlet,
        trading_date: NaiveDate,
        price_snapshot: &[PriceUpdate],
    ) -> Result<RotationOutcome, AppError> {
        let next_date = trading_date
            .succ_opt()
            .ok_or_else(|| anyhow::anyhow!("trading date out of calendar range"))?;

        let items = self.pricing.get_all_items().await?;
        let default_units: HashMap<&str, &str> = items
            .iter()
            .map(|i| (i.item_key.as_str(), i.unit.as_str()))
            .collect();

        let (opening_effective, seeded_items, gross_at_lock) =
            with_retry("rotate-period", || async {
                let mut tx = self.pool.begin().await?;

                let opening_effective = self
                    .reporting
                    .opening_effective_in(&mut tx, outlet.id, trading_date)
                    .await?;
                let closings: Vec<ClosingLine> = self
                    .stock
                    .get_closings_in(&mut *tx, outlet.id, trading_date)
                    .await?
                    .into_iter()
                    .map(|row| ClosingLine {
                        item_key: row.item_key,
                        closing_qty: row.closing_qty,
                        waste_qty: row.waste_qty,
                    })
                    .collect();
                let seeds = compute::next_opening(&opening_effective, &closings);

                // Unit and buy price carry over from today's rows where we
                // have them.
                let today_openings = self
                    .stock
                    .get_openings_in(&mut *tx, outlet.id, trading_date)
                    .await?;
                let meta: HashMap<&str, (&str, Decimal)> = today_openings
                    .iter()
                    .map(|row| (row.item_key.as_str(), (row.unit.as_str(), row.buy_price)))
                    .collect();

                // Delete-then-insert keeps a re-run of the whole rotation
                // idempotent.
                self.stock
                    .delete_openings(&mut *tx, outlet.id, next_date)
                    .await?;
                for (key, qty) in &seeds {
                    let (unit, buy_price) = meta
                        .get(key.as_str())
                        .map(|(u, b)| (*u, *b))
                        .unwrap_or_else(|| {
                            (default_units.get(key.as_str()).copied().unwrap_or("unit"), Decimal::ZERO)
                        });
                    self.stock
                        .upsert_opening(&mut *tx, outlet.id, next_date, key, *qty, unit, buy_price)
                        .await?;
                }

                for update in price_snapshot {
                    self.pricing
                        .upsert_price(
                            &mut *tx,
                            outlet.id,
                            &update.item_key,
                            update.sell_price,
                            update.is_active.unwrap_or(true),
                        )
                        .await?;
                }

                // Capture the closing period's till takings before the
                // window pointer moves.
                let gross_at_lock = self
                    .reporting
                    .till_sales_gross(outlet.id, trading_date)
                    .await?;
                self.periods
                    .upsert_active_period(&mut *tx, outlet.id, Utc::now())
                    .await?;

                // The day before this one was snapshotted by its own
                // rotation; its live rows are no longer needed.
                if let Some(prev) = trading_date.pred_opt() {
                    if self.periods.has_snapshot(&mut *tx, outlet.id, prev).await? {
                        self.stock.clear_day(&mut tx, outlet.id, prev).await?;
                    }
                }

                tx.commit().await?;
                Ok((opening_effective, seeds.len(), gross_at_lock))
            })
            .await?;

        // Best-effort: a failed snapshot degrades the carryover fallback for
        // this one day but must not stop the outlet from operating.
        let snapshot_sequence = match self
            .write_snapshot(outlet, trading_date, &opening_effective, gross_at_lock)
            .await
        {
            Ok(snapshot) => Some(snapshot.sequence),
            Err(e) => {
                tracing::warn!(
                    "snapshot write for outlet {} on {} failed: {}",
                    outlet.code,
                    trading_date,
                    e
                );
                None
            }
        };

        self.lock(outlet, trading_date, "submit-and-rotate").await?;

        Ok(RotationOutcome {
            trading_date,
            next_date,
            seeded_items,
            snapshot_sequence,
            locked: true,
        })
    }

    async fn write_snapshot(
        &self,
        outlet: &Outlet,
        trading_date: NaiveDate,
        opening_effective: &HashMap<String, Decimal>,
        gross_payments: Decimal,
    ) -> Result<PeriodSnapshot, AppError> {
        let prices = self.reporting.resolved_prices(outlet.id).await?;

        let closings: Vec<SnapshotClosingLine> = self
            .stock
            .get_closings(outlet.id, trading_date)
            .await?
            .into_iter()
            .map(|row| SnapshotClosingLine {
                sell_price: prices.get(&row.item_key).copied().unwrap_or(Decimal::ZERO),
                item_key: row.item_key,
                closing_qty: row.closing_qty,
                waste_qty: row.waste_qty,
            })
            .collect();

        let expenses: Vec<SnapshotExpenseLine> = self
            .ledger
            .get_expenses(outlet.id, trading_date)
            .await?
            .into_iter()
            .map(|e| SnapshotExpenseLine {
                amount: e.amount,
                note: e.note,
            })
            .collect();

        let body = SnapshotBody {
            opening: opening_effective
                .iter()
                .map(|(k, v)| (k.clone(), *v))
                .collect(),
            closings,
            expenses,
            gross_payments,
        };

        self.periods
            .insert_snapshot(outlet.id, trading_date, &body)
            .await
    }
}

// Transactional properties need a real database; run with a migrated
// Postgres behind DATABASE_URL:
//   cargo test -- --ignored
#[cfg(test)]
mod db_tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    use crate::{
        db::{CommissionRepository, OutletRepository},
        services::{
            commission_service::CommissionService,
            ledger_service::LedgerService,
            stock_service::{StockService, SupplyLine},
        },
    };

    struct Harness {
        outlets: OutletRepository,
        pricing: PricingRepository,
        stock_repo: StockRepository,
        stock: StockService,
        ledger: LedgerService,
        periods: PeriodService,
        reporting: ReportingService,
    }

    async fn harness() -> Harness {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for db tests");
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .expect("database connection");
        sqlx::migrate!().run(&pool).await.expect("migrations");

        let outlets = OutletRepository::new(pool.clone());
        let pricing = PricingRepository::new(pool.clone());
        let commissions = CommissionRepository::new(pool.clone());
        let stock_repo = StockRepository::new(pool.clone());
        let ledger_repo = LedgerRepository::new(pool.clone());
        let period_repo = PeriodRepository::new(pool.clone());

        let reporting = ReportingService::new(
            stock_repo.clone(),
            ledger_repo.clone(),
            pricing.clone(),
            period_repo.clone(),
            pool.clone(),
        );
        let periods = PeriodService::new(
            period_repo.clone(),
            stock_repo.clone(),
            ledger_repo.clone(),
            pricing.clone(),
            reporting.clone(),
            pool.clone(),
        );
        let commission_service =
            CommissionService::new(commissions, outlets.clone(), reporting.clone());
        let stock = StockService::new(
            stock_repo.clone(),
            pricing.clone(),
            reporting.clone(),
            periods.clone(),
            commission_service,
            pool.clone(),
        );
        let ledger = LedgerService::new(ledger_repo, period_repo, periods.clone(), pool);

        Harness {
            outlets,
            pricing,
            stock_repo,
            stock,
            ledger,
            periods,
            reporting,
        }
    }

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn fresh_outlet(h: &Harness) -> Outlet {
        let tag = Uuid::new_v4().simple().to_string();
        h.outlets
            .create_outlet(&format!("Outlet {tag}"), &tag, false)
            .await
            .expect("create outlet")
    }

    async fn fresh_item(h: &Harness, default_price: i64) -> String {
        let key = format!("beef-{}", Uuid::new_v4().simple());
        h.pricing
            .create_item(&key, "Beef", "kg", dec(default_price))
            .await
            .expect("create item");
        key
    }

    fn supply(key: &str, quantity: i64) -> SupplyLine {
        SupplyLine {
            item_key: key.to_string(),
            quantity: dec(quantity),
            unit: None,
            buy_price: Decimal::ZERO,
        }
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn lock_is_monotonic_and_idempotent() {
        let h = harness().await;
        let outlet = fresh_outlet(&h).await;
        let day = date(2026, 3, 10);

        let first = h.periods.lock(&outlet, day, "test-lock").await.unwrap();
        assert!(first.locked);

        let err = h
            .ledger
            .post_deposit(&outlet, day, dec(500), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PeriodLocked { .. }));

        // Re-lock is a successful no-op keeping the original stamp.
        let again = h.periods.lock(&outlet, day, "second-lock").await.unwrap();
        assert!(again.locked);
        assert_eq!(again.locked_by.as_deref(), Some("test-lock"));
        assert_eq!(again.locked_at, first.locked_at);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn closing_submission_is_idempotent() {
        let h = harness().await;
        let outlet = fresh_outlet(&h).await;
        let key = fresh_item(&h, 1000).await;
        let day = date(2026, 3, 10);

        h.stock
            .submit_supply(&outlet, day, &[supply(&key, 10)])
            .await
            .unwrap();

        let first = h
            .stock
            .submit_closing(&outlet, day, &key, dec(6), dec(1))
            .await
            .unwrap();
        let second = h
            .stock
            .submit_closing(&outlet, day, &key, dec(6), dec(1))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.closing_qty, dec(6));
        assert_eq!(second.waste_qty, dec(1));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn over_closing_is_rejected_with_the_maximum() {
        let h = harness().await;
        let outlet = fresh_outlet(&h).await;
        let key = fresh_item(&h, 1000).await;
        let day = date(2026, 3, 10);

        h.stock
            .submit_supply(&outlet, day, &[supply(&key, 10)])
            .await
            .unwrap();

        let err = h
            .stock
            .submit_closing(&outlet, day, &key, dec(12), dec(1))
            .await
            .unwrap_err();
        match err {
            AppError::ExceedsAvailable { max_allowed, .. } => {
                assert_eq!(max_allowed, dec(9));
            }
            other => panic!("expected ExceedsAvailable, got {other:?}"),
        }
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn rotation_reruns_seed_the_same_opening_set() {
        let h = harness().await;
        let outlet = fresh_outlet(&h).await;
        let key = fresh_item(&h, 1000).await;
        let day = date(2026, 3, 10);

        h.stock
            .submit_supply(&outlet, day, &[supply(&key, 10)])
            .await
            .unwrap();
        h.stock
            .submit_closing(&outlet, day, &key, dec(6), dec(1))
            .await
            .unwrap();

        let first = h.periods.rotate(&outlet, day, &[]).await.unwrap();
        let seeded_once = h
            .stock_repo
            .get_openings(outlet.id, first.next_date)
            .await
            .unwrap();

        let second = h.periods.rotate(&outlet, day, &[]).await.unwrap();
        let seeded_twice = h
            .stock_repo
            .get_openings(outlet.id, second.next_date)
            .await
            .unwrap();

        assert_eq!(seeded_once.len(), 1);
        assert_eq!(seeded_twice.len(), 1);
        assert_eq!(seeded_once[0].item_key, seeded_twice[0].item_key);
        assert_eq!(seeded_once[0].quantity, dec(3));
        assert_eq!(seeded_twice[0].quantity, dec(3));
        // A retried rotation appends a fresh snapshot rather than clobbering.
        assert_eq!(second.snapshot_sequence, Some(2));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL"]
    async fn carryover_survives_row_clearing_via_snapshot() {
        let h = harness().await;
        let outlet = fresh_outlet(&h).await;
        let key = fresh_item(&h, 1000).await;
        let day = date(2026, 3, 10);
        let next = date(2026, 3, 11);

        h.stock
            .submit_supply(&outlet, day, &[supply(&key, 10)])
            .await
            .unwrap();
        h.stock
            .submit_closing(&outlet, day, &key, dec(6), dec(1))
            .await
            .unwrap();
        h.ledger
            .post_expense(&outlet, day, dec(200), Some("transport"))
            .await
            .unwrap();
        h.ledger
            .post_deposit(&outlet, day, dec(1000), None, None)
            .await
            .unwrap();

        // Live computation: 3 sold x 1000 - 200 expenses - 1000 deposited.
        let live = h.reporting.carryover(outlet.id, next).await.unwrap();
        assert_eq!(live, dec(1800));

        h.periods.rotate(&outlet, day, &[]).await.unwrap();
        // Rotating the following day clears the snapshotted day's live rows.
        h.periods.rotate(&outlet, next, &[]).await.unwrap();
        assert!(
            h.stock_repo
                .get_closings(outlet.id, day)
                .await
                .unwrap()
                .is_empty()
        );

        let from_snapshot = h.reporting.carryover(outlet.id, next).await.unwrap();
        assert_eq!(from_snapshot, dec(1800));
    }
}
