// src/models/stock.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Catalogue entry. The default sell price applies wherever no
/// outlet-specific price row overrides it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,

    #[schema(example = "beef")]
    pub item_key: String,

    #[schema(example = "Beef")]
    pub name: String,

    #[schema(example = "kg")]
    pub unit: String,

    #[schema(example = "600.00")]
    pub default_sell_price: Decimal,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Stock available to sell on a trading day. Created by a supply submission
/// or seeded by the previous day's rotation; unique per (outlet, date, item).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpeningRow {
    pub id: Uuid,

    #[schema(ignore)]
    pub outlet_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-08-15")]
    pub trading_date: NaiveDate,

    pub item_key: String,

    #[schema(example = "10.0")]
    pub quantity: Decimal,

    pub unit: String,

    #[schema(example = "450.00")]
    pub buy_price: Decimal,

    pub created_at: DateTime<Utc>,
}

/// End-of-day count for one item: what is left on the counter plus what was
/// thrown away. Each item closes exactly once per day.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClosingRow {
    pub id: Uuid,

    #[schema(ignore)]
    pub outlet_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-08-15")]
    pub trading_date: NaiveDate,

    pub item_key: String,

    #[schema(example = "6.0")]
    pub closing_qty: Decimal,

    #[schema(example = "1.0")]
    pub waste_qty: Decimal,

    pub created_at: DateTime<Utc>,
}
