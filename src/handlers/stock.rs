// src/handlers/stock.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{load_outlet, validate_not_negative},
    models::stock::{ClosingRow, OpeningRow},
    services::stock_service::SupplyLine,
};

// ---
// Payload: SubmitSupply
// ---

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SupplyLinePayload {
    #[validate(length(min = 1, message = "The item key is required."))]
    pub item_key: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub quantity: Decimal,

    /// Optional; validated against the catalogue unit when present.
    pub unit: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub buy_price: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitSupplyPayload {
    pub outlet_id: Uuid,

    /// Trading day the supply belongs to. Defaults to today in the
    /// configured trading timezone.
    #[schema(value_type = Option<String>, format = Date)]
    pub trading_date: Option<NaiveDate>,

    #[validate(length(min = 1, message = "At least one supply line is required."), nested)]
    pub lines: Vec<SupplyLinePayload>,
}

// POST /api/stock/supply
#[utoipa::path(
    post,
    path = "/api/stock/supply",
    tag = "Stock",
    request_body = SubmitSupplyPayload,
    responses(
        (status = 201, description = "Opening rows recorded", body = Vec<OpeningRow>),
        (status = 404, description = "Outlet or item not found"),
        (status = 409, description = "Trading day already locked")
    )
)]
pub async fn submit_supply(
    State(app_state): State<AppState>,
    Json(payload): Json<SubmitSupplyPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outlet = load_outlet(&app_state, payload.outlet_id).await?;
    let trading_date = payload.trading_date.unwrap_or_else(|| app_state.trading_today());

    let lines: Vec<SupplyLine> = payload
        .lines
        .iter()
        .map(|l| SupplyLine {
            item_key: l.item_key.clone(),
            quantity: l.quantity,
            unit: l.unit.clone(),
            buy_price: l.buy_price,
        })
        .collect();

    let rows = app_state
        .stock
        .submit_supply(&outlet, trading_date, &lines)
        .await?;

    Ok((StatusCode::CREATED, Json(rows)))
}

// ---
// Payload: SubmitClosing
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitClosingPayload {
    pub outlet_id: Uuid,

    #[schema(value_type = Option<String>, format = Date)]
    pub trading_date: Option<NaiveDate>,

    #[validate(length(min = 1, message = "The item key is required."))]
    pub item_key: String,

    #[validate(custom(function = "validate_not_negative"))]
    pub closing_qty: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub waste_qty: Decimal,
}

// POST /api/stock/closing
#[utoipa::path(
    post,
    path = "/api/stock/closing",
    tag = "Stock",
    request_body = SubmitClosingPayload,
    responses(
        (status = 201, description = "Closing recorded (or the stored row on an idempotent repeat)", body = ClosingRow),
        (status = 404, description = "Outlet or item not found"),
        (status = 409, description = "Trading day already locked"),
        (status = 422, description = "Closing quantity exceeds available stock; maxAllowed is returned")
    )
)]
pub async fn submit_closing(
    State(app_state): State<AppState>,
    Json(payload): Json<SubmitClosingPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outlet = load_outlet(&app_state, payload.outlet_id).await?;
    let trading_date = payload.trading_date.unwrap_or_else(|| app_state.trading_today());

    let row = app_state
        .stock
        .submit_closing(
            &outlet,
            trading_date,
            &payload.item_key,
            payload.closing_qty,
            payload.waste_qty,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(row)))
}
