// src/db/period_repo.rs

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::period::{ActivePeriod, PeriodLock, PeriodSnapshot, PeriodState, SnapshotBody},
};

#[derive(Clone)]
pub struct PeriodRepository {
    pool: PgPool,
}

impl PeriodRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  LOCKS
    // =========================================================================

    /// Makes sure the (outlet, date) lock row exists, OPEN. The unique
    /// constraint makes this safe to race: exactly one row survives.
    pub async fn ensure_lock_row<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO period_locks (outlet_id, trading_date, locked)
            VALUES ($1, $2, FALSE)
            ON CONFLICT (outlet_id, trading_date) DO NOTHING
            "#,
        )
        .bind(outlet_id)
        .bind(trading_date)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Reads the lock flag with FOR UPDATE so a concurrent lock transition
    /// cannot slip between this check and the caller's write. Only valid
    /// inside a transaction, after ensure_lock_row.
    pub async fn locked_for_update<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locked = sqlx::query_scalar::<_, bool>(
            "SELECT locked FROM period_locks WHERE outlet_id = $1 AND trading_date = $2 FOR UPDATE",
        )
        .bind(outlet_id)
        .bind(trading_date)
        .fetch_one(executor)
        .await?;
        Ok(locked)
    }

    /// Plain read for the externally visible period state. No row means the
    /// period has never been touched and is OPEN.
    pub async fn get_state(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<PeriodState, AppError> {
        let locked = sqlx::query_scalar::<_, bool>(
            "SELECT locked FROM period_locks WHERE outlet_id = $1 AND trading_date = $2",
        )
        .bind(outlet_id)
        .bind(trading_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match locked {
            Some(true) => PeriodState::Locked,
            _ => PeriodState::Open,
        })
    }

    /// State read that joins the caller's transaction.
    pub async fn get_state_in<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<PeriodState, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let locked = sqlx::query_scalar::<_, bool>(
            "SELECT locked FROM period_locks WHERE outlet_id = $1 AND trading_date = $2",
        )
        .bind(outlet_id)
        .bind(trading_date)
        .fetch_optional(executor)
        .await?;

        Ok(match locked {
            Some(true) => PeriodState::Locked,
            _ => PeriodState::Open,
        })
    }

    /// Compare-and-set lock transition. The WHERE clause only fires on an
    /// OPEN row, so re-locking keeps the original locked_at and reason.
    pub async fn mark_locked<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
        reason: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE period_locks
            SET locked = TRUE, locked_at = now(), locked_by = $3
            WHERE outlet_id = $1 AND trading_date = $2 AND locked = FALSE
            "#,
        )
        .bind(outlet_id)
        .bind(trading_date)
        .bind(reason)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn get_lock<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<PeriodLock, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lock = sqlx::query_as::<_, PeriodLock>(
            "SELECT * FROM period_locks WHERE outlet_id = $1 AND trading_date = $2",
        )
        .bind(outlet_id)
        .bind(trading_date)
        .fetch_one(executor)
        .await?;
        Ok(lock)
    }

    // =========================================================================
    //  SNAPSHOTS
    // =========================================================================

    /// Appends a snapshot with the next sequence number. Retried rotations
    /// get a fresh sequence instead of clobbering the previous copy.
    pub async fn insert_snapshot(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
        body: &SnapshotBody,
    ) -> Result<PeriodSnapshot, AppError> {
        let snapshot = sqlx::query_as::<_, PeriodSnapshot>(
            r#"
            INSERT INTO period_snapshots (outlet_id, trading_date, sequence, body)
            VALUES (
                $1, $2,
                (SELECT COALESCE(MAX(sequence), 0) + 1
                 FROM period_snapshots
                 WHERE outlet_id = $1 AND trading_date = $2),
                $3
            )
            RETURNING *
            "#,
        )
        .bind(outlet_id)
        .bind(trading_date)
        .bind(sqlx::types::Json(body))
        .fetch_one(&self.pool)
        .await?;
        Ok(snapshot)
    }

    pub async fn latest_snapshot(
        &self,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<Option<PeriodSnapshot>, AppError> {
        let snapshot = sqlx::query_as::<_, PeriodSnapshot>(
            r#"
            SELECT * FROM period_snapshots
            WHERE outlet_id = $1 AND trading_date = $2
            ORDER BY sequence DESC
            LIMIT 1
            "#,
        )
        .bind(outlet_id)
        .bind(trading_date)
        .fetch_optional(&self.pool)
        .await?;
        Ok(snapshot)
    }

    pub async fn has_snapshot<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        trading_date: NaiveDate,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM period_snapshots WHERE outlet_id = $1 AND trading_date = $2)",
        )
        .bind(outlet_id)
        .bind(trading_date)
        .fetch_one(executor)
        .await?;
        Ok(exists)
    }

    // =========================================================================
    //  ACTIVE PERIOD WINDOW
    // =========================================================================

    pub async fn upsert_active_period<'e, E>(
        &self,
        executor: E,
        outlet_id: Uuid,
        period_start_at: DateTime<Utc>,
    ) -> Result<ActivePeriod, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let period = sqlx::query_as::<_, ActivePeriod>(
            r#"
            INSERT INTO active_periods (outlet_id, period_start_at)
            VALUES ($1, $2)
            ON CONFLICT (outlet_id)
            DO UPDATE SET period_start_at = EXCLUDED.period_start_at
            RETURNING *
            "#,
        )
        .bind(outlet_id)
        .bind(period_start_at)
        .fetch_one(executor)
        .await?;
        Ok(period)
    }

    pub async fn get_active_period(
        &self,
        outlet_id: Uuid,
    ) -> Result<Option<ActivePeriod>, AppError> {
        let period = sqlx::query_as::<_, ActivePeriod>(
            "SELECT * FROM active_periods WHERE outlet_id = $1",
        )
        .bind(outlet_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(period)
    }
}
