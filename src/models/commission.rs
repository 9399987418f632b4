// src/models/commission.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "commission_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionStatus {
    Pending,
    Approved,
    Paid,
}

/// Per-supervisor commission for one outlet-day. Recomputed (and the value
/// fields overwritten) after every closing submission; the status field is
/// left to the approval workflow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRecord {
    pub id: Uuid,

    #[schema(ignore)]
    pub outlet_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-08-15")]
    pub trading_date: NaiveDate,

    #[schema(example = "SUP-01")]
    pub supervisor_code: String,

    pub sales_value: Decimal,
    pub expenses_value: Decimal,
    pub waste_value: Decimal,
    pub profit_value: Decimal,

    #[schema(example = "0.10")]
    pub rate: Decimal,

    pub commission_value: Decimal,
    pub status: CommissionStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
