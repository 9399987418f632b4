// src/services/commission_service.rs
//
// Post-commit side effect: after every item close, re-derive the day's
// profit and upsert one commission record per supervisor assigned to the
// outlet. Errors here are caught by the hook runner and logged, never
// propagated into the closing submission.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::{CommissionRepository, OutletRepository},
    models::outlet::Outlet,
    services::reporting_service::ReportingService,
};

/// Flat default until per-supervisor rates land in the directory.
fn default_rate() -> Decimal {
    Decimal::new(10, 2) // 0.10
}

#[derive(Clone)]
pub struct CommissionService {
    commissions: CommissionRepository,
    outlets: OutletRepository,
    reporting: ReportingService,
}

impl CommissionService {
    pub fn new(
        commissions: CommissionRepository,
        outlets: OutletRepository,
        reporting: ReportingService,
    ) -> Self {
        Self {
            commissions,
            outlets,
            reporting,
        }
    }

    pub async fn recompute_for_day(
        &self,
        outlet: &Outlet,
        trading_date: NaiveDate,
    ) -> Result<(), AppError> {
        let supervisors = self.outlets.active_supervisors(outlet.id).await?;
        if supervisors.is_empty() {
            tracing::debug!(
                "no supervisors assigned to outlet {}; skipping commission recompute",
                outlet.code
            );
            return Ok(());
        }

        let totals = self
            .reporting
            .day_totals_live(outlet.id, trading_date)
            .await?;
        let profit = totals.weight_sales - totals.expenses - totals.waste_value;
        let rate = default_rate();
        let commission = profit * rate;

        for supervisor in supervisors {
            self.commissions
                .upsert(
                    outlet.id,
                    trading_date,
                    &supervisor.code,
                    totals.weight_sales,
                    totals.expenses,
                    totals.waste_value,
                    profit,
                    rate,
                    commission,
                )
                .await?;
        }

        tracing::debug!(
            "commissions recomputed for outlet {} on {}: profit {}",
            outlet.code,
            trading_date,
            profit
        );
        Ok(())
    }
}
