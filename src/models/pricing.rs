// src/models/pricing.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Outlet-specific sell price for one item. Overrides the item's default
/// price; when inactive the item is not sellable at that outlet and its
/// effective price is zero.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceRow {
    pub id: Uuid,

    #[schema(ignore)]
    pub outlet_id: Uuid,

    #[schema(example = "beef")]
    pub item_key: String,

    #[schema(example = "1000.00")]
    pub sell_price: Decimal,

    pub is_active: bool,
    pub updated_at: DateTime<Utc>,
}

/// One line of the price snapshot an outlet hands in at rotation time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdate {
    #[schema(example = "beef")]
    pub item_key: String,

    #[schema(example = "1050.00")]
    pub sell_price: Decimal,

    /// Defaults to true; an explicit false delists the item at this outlet.
    pub is_active: Option<bool>,
}
