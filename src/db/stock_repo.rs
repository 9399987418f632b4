// src/db/stock_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::stock::{ClosingRow, OpeningRow},
};

#[derive(Clone)]
pub struct StockRepository {
    pool: PgPool,
}

impl StockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Reads
    // ---
    // Reads that do not need to sit inside a caller's transaction go straight
    // to the pool.

    pub async fn get_openings(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<Vec<OpeningRow>, AppError> {
        let rows = sqlx::query_as::<_, OpeningRow>(
            "SELECT * FROM opening_rows WHERE outlet_id = $1 AND trading_date = $2 ORDER BY item_key ASC",
        )
        .bind(outlet_id)
        .bind(trading_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_closings(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<Vec<ClosingRow>, AppError> {
        let rows = sqlx::query_as::<_, ClosingRow>(
            "SELECT * FROM closing_rows WHERE outlet_id = $1 AND trading_date = $2 ORDER BY item_key ASC",
        )
        .bind(outlet_id)
        .bind(trading_date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Transactional variants, used wherever the caller already holds the
    // period guard inside its own transaction.

    pub async fn get_openings_in<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<Vec<OpeningRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, OpeningRow>(
            "SELECT * FROM opening_rows WHERE outlet_id = $1 AND trading_date = $2 ORDER BY item_key ASC",
        )
        .bind(outlet_id)
        .bind(trading_date)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn get_closings_in<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<Vec<ClosingRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ClosingRow>(
            "SELECT * FROM closing_rows WHERE outlet_id = $1 AND trading_date = $2 ORDER BY item_key ASC",
        )
        .bind(outlet_id)
        .bind(trading_date)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn get_closing<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
        item_key: &str,
    ) -> Result<Option<ClosingRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ClosingRow>(
            "SELECT * FROM closing_rows WHERE outlet_id = $1 AND trading_date = $2 AND item_key = $3",
        )
        .bind(outlet_id)
        .bind(trading_date)
        .bind(item_key)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    // ---
    // Writes
    // ---

    /// Upserts one opening row. A repeated supply submission for the same
    /// (outlet, date, item) REPLACES the quantity: the attendant reports the
    /// stock on hand, not an increment.
    pub async fn upsert_opening<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
        item_key: &str,
        quantity: Decimal,
        unit: &str,
        buy_price: Decimal,
    ) -> Result<OpeningRow, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, OpeningRow>(
            r#"
            INSERT INTO opening_rows (outlet_id, trading_date, item_key, quantity, unit, buy_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (outlet_id, trading_date, item_key)
            DO UPDATE SET quantity = EXCLUDED.quantity,
                          unit = EXCLUDED.unit,
                          buy_price = EXCLUDED.buy_price
            RETURNING *
            "#,
        )
        .bind(outlet_id)
        .bind(trading_date)
        .bind(item_key)
        .bind(quantity)
        .bind(unit)
        .bind(buy_price)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    /// Inserts a closing row, returning None when one already exists for the
    /// key. The unique constraint is what enforces "each item closes exactly
    /// once per day" even under concurrent retries.
    pub async fn try_insert_closing<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
        item_key: &str,
        closing_qty: Decimal,
        waste_qty: Decimal,
    ) -> Result<Option<ClosingRow>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ClosingRow>(
            r#"
            INSERT INTO closing_rows (outlet_id, trading_date, item_key, closing_qty, waste_qty)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (outlet_id, trading_date, item_key) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(outlet_id)
        .bind(trading_date)
        .bind(item_key)
        .bind(closing_qty)
        .bind(waste_qty)
        .fetch_optional(executor)
        .await?;
        Ok(row)
    }

    /// Clears a previously seeded opening set before re-seeding. Rotation
    /// relies on this for its delete-then-insert idempotency.
    pub async fn delete_openings<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM opening_rows WHERE outlet_id = $1 AND trading_date = $2")
            .bind(outlet_id)
            .bind(trading_date)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Removes the live stock rows of an already-snapshotted day. From here
    /// on the carryover calculator must go through the snapshot.
    pub async fn clear_day(
        &self,
        conn: &mut sqlx::PgConnection,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM closing_rows WHERE outlet_id = $1 AND trading_date = $2")
            .bind(outlet_id)
            .bind(trading_date)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM opening_rows WHERE outlet_id = $1 AND trading_date = $2")
            .bind(outlet_id)
            .bind(trading_date)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
