// src/config.rs

use chrono::{FixedOffset, NaiveDate, Utc};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        CommissionRepository, LedgerRepository, OutletRepository, PeriodRepository,
        PricingRepository, StockRepository,
    },
    services::{
        commission_service::CommissionService, ledger_service::LedgerService,
        period_service::PeriodService, reporting_service::ReportingService,
        stock_service::StockService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub outlets: OutletRepository,
    pub pricing: PricingRepository,
    pub commissions: CommissionRepository,
    pub stock: StockService,
    pub ledger: LedgerService,
    pub periods: PeriodService,
    pub reporting: ReportingService,
    /// Offset used to decide which calendar date "today" is for trading
    /// purposes. Days roll at midnight in this offset, not UTC midnight.
    pub trading_offset: FixedOffset,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let trading_offset_hours: i32 = env::var("TRADING_UTC_OFFSET_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let trading_offset = FixedOffset::east_opt(trading_offset_hours * 3600)
            .ok_or_else(|| anyhow::anyhow!("TRADING_UTC_OFFSET_HOURS out of range"))?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("database connection established");

        // --- Wire the dependency graph ---
        let outlets = OutletRepository::new(db_pool.clone());
        let pricing = PricingRepository::new(db_pool.clone());
        let commissions = CommissionRepository::new(db_pool.clone());
        let stock_repo = StockRepository::new(db_pool.clone());
        let ledger_repo = LedgerRepository::new(db_pool.clone());
        let period_repo = PeriodRepository::new(db_pool.clone());

        let reporting = ReportingService::new(
            stock_repo.clone(),
            ledger_repo.clone(),
            pricing.clone(),
            period_repo.clone(),
            db_pool.clone(),
        );
        let periods = PeriodService::new(
            period_repo.clone(),
            stock_repo.clone(),
            ledger_repo.clone(),
            pricing.clone(),
            reporting.clone(),
            db_pool.clone(),
        );
        let commission_service =
            CommissionService::new(commissions.clone(), outlets.clone(), reporting.clone());
        let stock = StockService::new(
            stock_repo.clone(),
            pricing.clone(),
            reporting.clone(),
            periods.clone(),
            commission_service,
            db_pool.clone(),
        );
        let ledger = LedgerService::new(
            ledger_repo,
            period_repo,
            periods.clone(),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            outlets,
            pricing,
            commissions,
            stock,
            ledger,
            periods,
            reporting,
            trading_offset,
        })
    }

    /// The current trading date: today's calendar date in the configured
    /// trading offset. Handlers use this when a payload omits `tradingDate`.
    pub fn trading_today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.trading_offset).date_naive()
    }
}
