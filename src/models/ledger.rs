// src/models/ledger.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "deposit_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositStatus {
    Pending,
    Valid,
    Invalid,
}

/// A claimed cash deposit. Append-only; an admin override may flip the
/// status later, and only INVALID entries drop out of the verified total.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    pub id: Uuid,

    #[schema(ignore)]
    pub outlet_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-08-15")]
    pub trading_date: NaiveDate,

    #[schema(example = "1000.00")]
    pub amount: Decimal,

    /// M-Pesa style reference code. Not unique: physical confirmation
    /// messages reuse codes across days.
    #[schema(example = "QGH7K2MX91")]
    pub code: Option<String>,

    pub note: Option<String>,
    pub status: DepositStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,

    #[schema(ignore)]
    pub outlet_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-08-15")]
    pub trading_date: NaiveDate,

    #[schema(example = "200.00")]
    pub amount: Decimal,

    #[schema(example = "transport")]
    pub note: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// A payment fact pushed in by the mobile-money webhook. Attribution to
/// "today's till" is decided at read time against the outlet's active
/// period window.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalPayment {
    pub id: Uuid,

    #[schema(ignore)]
    pub outlet_id: Uuid,

    #[schema(example = "350.00")]
    pub amount: Decimal,

    pub status: PaymentStatus,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
