// src/models/period.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodState {
    Open,
    Locked,
}

/// Lock record per (outlet, trading date). Absence of a row means OPEN.
/// Once locked=true the day is terminal: no opening, closing, deposit or
/// expense row for that pair may be created again.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodLock {
    pub id: Uuid,

    #[schema(ignore)]
    pub outlet_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-08-15")]
    pub trading_date: NaiveDate,

    pub locked: bool,
    pub locked_at: Option<DateTime<Utc>>,

    #[schema(example = "submit-and-rotate")]
    pub locked_by: Option<String>,
}

/// One closing line as frozen into a snapshot. The sell price resolved at
/// lock time rides along so the fallback recomputation does not drift when
/// the pricebook changes at the rotation boundary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotClosingLine {
    pub item_key: String,
    pub closing_qty: Decimal,
    pub waste_qty: Decimal,
    pub sell_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotExpenseLine {
    pub amount: Decimal,
    pub note: Option<String>,
}

/// Typed body of a period snapshot: everything the carryover calculator
/// needs to reproduce the day's totals after the live rows are rotated away.
/// Verified deposits are deliberately absent; deposit rows are never cleared
/// and stay the single source of truth.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotBody {
    /// Effective opening quantity per item at lock time.
    pub opening: BTreeMap<String, Decimal>,
    pub closings: Vec<SnapshotClosingLine>,
    pub expenses: Vec<SnapshotExpenseLine>,
    /// Gross till payments attributed to the period when it was locked.
    pub gross_payments: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PeriodSnapshot {
    pub id: Uuid,
    pub outlet_id: Uuid,
    pub trading_date: NaiveDate,
    pub sequence: i32,
    pub body: sqlx::types::Json<SnapshotBody>,
    pub created_at: DateTime<Utc>,
}

/// Live pointer to the start of the current trading window for an outlet.
/// Overwritten on every rotation; external payment facts earlier than this
/// do not count towards today's till.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivePeriod {
    #[schema(ignore)]
    pub outlet_id: Uuid,

    pub period_start_at: DateTime<Utc>,
}
