// src/db/commission_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, models::commission::CommissionRecord};

#[derive(Clone)]
pub struct CommissionRepository {
    pool: PgPool,
}

impl CommissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts the commission row for one supervisor-day. Resubmission
    /// overwrites the value fields with freshly computed totals; the status
    /// belongs to the approval workflow and is left alone.
    #[allow(clippy::too_many_arguments)]
    pub async fn upsert(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
        supervisor_code: &str,
        sales_value: Decimal,
        expenses_value: Decimal,
        waste_value: Decimal,
        profit_value: Decimal,
        rate: Decimal,
        commission_value: Decimal,
    ) -> Result<CommissionRecord, AppError> {
        let record = sqlx::query_as::<_, CommissionRecord>(
            r#"
            INSERT INTO commission_records (
                outlet_id, trading_date, supervisor_code,
                sales_value, expenses_value, waste_value, profit_value,
                rate, commission_value
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (outlet_id, trading_date, supervisor_code)
            DO UPDATE SET
                sales_value = EXCLUDED.sales_value,
                expenses_value = EXCLUDED.expenses_value,
                waste_value = EXCLUDED.waste_value,
                profit_value = EXCLUDED.profit_value,
                rate = EXCLUDED.rate,
                commission_value = EXCLUDED.commission_value,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(outlet_id)
        .bind(trading_date)
        .bind(supervisor_code)
        .bind(sales_value)
        .bind(expenses_value)
        .bind(waste_value)
        .bind(profit_value)
        .bind(rate)
        .bind(commission_value)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn for_day(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<Vec<CommissionRecord>, AppError> {
        let rows = sqlx::query_as::<_, CommissionRecord>(
            r#"
            SELECT * FROM commission_records
            WHERE outlet_id = $1 AND trading_date = $2
            ORDER BY supervisor_code ASC
            "#,
        )
        .bind(outlet_id)
        .bind(trading_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
