// src/models/reporting.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The header block every report and chat summary is built from.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HeaderTotals {
    #[schema(value_type = String, format = Date, example = "2026-08-15")]
    pub trading_date: NaiveDate,

    /// Expected revenue from stock movement (sold quantity x sell price).
    #[schema(example = "3000.00")]
    pub weight_sales: Decimal,

    #[schema(example = "200.00")]
    pub expenses: Decimal,

    #[schema(example = "1000.00")]
    pub waste_value: Decimal,

    #[schema(example = "1000.00")]
    pub verified_deposits: Decimal,

    /// Gross till payments attributed to the current period window.
    #[schema(example = "0.00")]
    pub till_sales_gross: Decimal,

    /// Signed outstanding balance carried over from the prior trading day.
    #[schema(example = "0.00")]
    pub carryover_prev: Decimal,

    #[schema(example = "1800.00")]
    pub amount_to_deposit: Decimal,

    /// Non-blocking data anomalies (clamped quantities, missing prices).
    pub warnings: Vec<String>,
}

/// What a rotation did, for the caller's confirmation message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RotationOutcome {
    #[schema(value_type = String, format = Date, example = "2026-08-15")]
    pub trading_date: NaiveDate,

    #[schema(value_type = String, format = Date, example = "2026-08-16")]
    pub next_date: NaiveDate,

    /// Items seeded into tomorrow's opening stock.
    pub seeded_items: usize,

    /// Sequence of the snapshot written for the closed day; None when the
    /// best-effort snapshot write failed.
    pub snapshot_sequence: Option<i32>,

    pub locked: bool,
}
