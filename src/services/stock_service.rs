// src/services/stock_service.rs
//
// Attendant-facing stock writes: the morning supply submission and the
// per-item closing submission. Both run guard-then-write inside one
// transaction; the commission side effect fires only after commit.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    common::{error::AppError, hooks::PostCommitHooks, retry::with_retry},
    db::{PricingRepository, StockRepository},
    models::{
        outlet::Outlet,
        stock::{ClosingRow, OpeningRow},
    },
    services::{
        commission_service::CommissionService, period_service::PeriodService,
        reporting_service::ReportingService,
    },
};
use sqlx::PgPool;

/// One line of a supply submission, already validated against the catalogue.
#[derive(Debug, Clone)]
pub struct SupplyLine {
    pub item_key: String,
    pub quantity: Decimal,
    pub unit: Option<String>,
    pub buy_price: Decimal,
}

#[derive(Clone)]
pub struct StockService {
    stock: StockRepository,
    pricing: PricingRepository,
    reporting: ReportingService,
    period: PeriodService,
    commissions: CommissionService,
    pool: PgPool,
}

impl StockService {
    pub fn new(
        stock: StockRepository,
        pricing: PricingRepository,
        reporting: ReportingService,
        period: PeriodService,
        commissions: CommissionService,
        pool: PgPool,
    ) -> Self {
        Self {
            stock,
            pricing,
            reporting,
            period,
            commissions,
            pool,
        }
    }

    /// Records the stock delivered for a trading day. A repeated submission
    /// for the same item replaces the quantity: the attendant reports stock
    /// on hand, not increments.
    pub async fn submit_supply(
        &self,
        outlet: &Outlet,
        trading_date: NaiveDate,
        lines: &[SupplyLine],
    ) -> Result<Vec<OpeningRow>, AppError> {
        // Resolve every line against the catalogue before any write.
        let mut resolved: Vec<(&SupplyLine, String)> = Vec::with_capacity(lines.len());
        for line in lines {
            let item = self
                .pricing
                .get_item(&line.item_key)
                .await?
                .ok_or_else(|| AppError::ItemNotFound(line.item_key.clone()))?;
            if let Some(unit) = &line.unit {
                if unit != &item.unit {
                    return Err(AppError::UnitMismatch {
                        item_key: line.item_key.clone(),
                        expected: item.unit,
                    });
                }
            }
            resolved.push((line, item.unit));
        }

        with_retry("submit-supply", || async {
            let mut tx = self.pool.begin().await?;
            self.period.assert_open(&mut tx, outlet, trading_date).await?;

            let mut rows = Vec::with_capacity(resolved.len());
            for (line, unit) in &resolved {
                let row = self
                    .stock
                    .upsert_opening(
                        &mut *tx,
                        outlet.id,
                        trading_date,
                        &line.item_key,
                        line.quantity,
                        unit,
                        line.buy_price,
                    )
                    .await?;
                rows.push(row);
            }

            tx.commit().await?;
            Ok(rows)
        })
        .await
    }

    /// Closes one item for the day. Idempotent: a repeat submission for the
    /// same (outlet, date, item) returns the stored row untouched. Rejects a
    /// count that exceeds what was ever available to sell.
    pub async fn submit_closing(
        &self,
        outlet: &Outlet,
        trading_date: NaiveDate,
        item_key: &str,
        closing_qty: Decimal,
        waste_qty: Decimal,
    ) -> Result<ClosingRow, AppError> {
        if self.pricing.get_item(item_key).await?.is_none() {
            return Err(AppError::ItemNotFound(item_key.to_string()));
        }

        let (row, created) = with_retry("submit-closing", || async {
            let mut tx = self.pool.begin().await?;
            self.period.assert_open(&mut tx, outlet, trading_date).await?;

            if let Some(existing) = self
                .stock
                .get_closing(&mut *tx, outlet.id, trading_date, item_key)
                .await?
            {
                tx.commit().await?;
                return Ok((existing, false));
            }

            let available = self
                .reporting
                .opening_effective_in(&mut tx, outlet.id, trading_date)
                .await?
                .get(item_key)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let max_allowed = available - waste_qty;
            if closing_qty > max_allowed {
                return Err(AppError::ExceedsAvailable {
                    item_key: item_key.to_string(),
                    max_allowed: max_allowed.max(Decimal::ZERO),
                });
            }

            match self
                .stock
                .try_insert_closing(
                    &mut *tx,
                    outlet.id,
                    trading_date,
                    item_key,
                    closing_qty,
                    waste_qty,
                )
                .await?
            {
                Some(row) => {
                    tx.commit().await?;
                    Ok((row, true))
                }
                // A concurrent submission won the insert race; same no-op
                // answer as the fast path above.
                None => {
                    let existing = self
                        .stock
                        .get_closing(&mut *tx, outlet.id, trading_date, item_key)
                        .await?
                        .ok_or_else(|| {
                            AppError::InternalServerError(anyhow::anyhow!(
                                "closing row vanished after conflict"
                            ))
                        })?;
                    tx.commit().await?;
                    Ok((existing, false))
                }
            }
        })
        .await?;

        if created {
            let mut hooks = PostCommitHooks::new();
            let commissions = self.commissions.clone();
            let hook_outlet = outlet.clone();
            hooks.push("commission-recompute", async move {
                commissions.recompute_for_day(&hook_outlet, trading_date).await
            });
            hooks.spawn();
        }

        Ok(row)
    }
}
