// src/handlers/periods.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::load_outlet,
    models::{
        period::{PeriodLock, PeriodState},
        pricing::PriceUpdate,
        reporting::RotationOutcome,
    },
};

// ---
// Payload: Rotate ("submit and rotate" end-of-day roll)
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RotatePayload {
    pub outlet_id: Uuid,

    /// The day being closed. Defaults to today in the trading timezone.
    #[schema(value_type = Option<String>, format = Date)]
    pub trading_date: Option<NaiveDate>,

    /// Price adjustments taking effect from tomorrow.
    #[serde(default)]
    pub prices: Vec<PriceUpdate>,
}

// POST /api/periods/rotate
#[utoipa::path(
    post,
    path = "/api/periods/rotate",
    tag = "Periods",
    request_body = RotatePayload,
    responses(
        (status = 200, description = "Day rotated and locked", body = RotationOutcome),
        (status = 404, description = "Outlet not found")
    )
)]
pub async fn rotate_period(
    State(app_state): State<AppState>,
    Json(payload): Json<RotatePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outlet = load_outlet(&app_state, payload.outlet_id).await?;
    let trading_date = payload.trading_date.unwrap_or_else(|| app_state.trading_today());

    let outcome = app_state
        .periods
        .rotate(&outlet, trading_date, &payload.prices)
        .await?;

    Ok((StatusCode::OK, Json(outcome)))
}

// ---
// Payload: explicit lock (admin override)
// ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LockPayload {
    pub outlet_id: Uuid,

    #[schema(value_type = Option<String>, format = Date)]
    pub trading_date: Option<NaiveDate>,

    pub reason: Option<String>,
}

// POST /api/periods/lock
#[utoipa::path(
    post,
    path = "/api/periods/lock",
    tag = "Periods",
    request_body = LockPayload,
    responses(
        (status = 200, description = "Period locked (no-op when already locked)", body = PeriodLock),
        (status = 404, description = "Outlet not found")
    )
)]
pub async fn lock_period(
    State(app_state): State<AppState>,
    Json(payload): Json<LockPayload>,
) -> Result<impl IntoResponse, AppError> {
    let outlet = load_outlet(&app_state, payload.outlet_id).await?;
    let trading_date = payload.trading_date.unwrap_or_else(|| app_state.trading_today());
    let reason = payload.reason.as_deref().unwrap_or("manual-lock");

    let lock = app_state.periods.lock(&outlet, trading_date, reason).await?;
    Ok((StatusCode::OK, Json(lock)))
}

// ---
// Query: period state
// ---

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PeriodStateQuery {
    pub outlet_id: Uuid,

    #[param(value_type = Option<String>, format = Date)]
    pub trading_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStateResponse {
    #[schema(value_type = String, format = Date)]
    pub trading_date: NaiveDate,
    pub state: PeriodState,
}

// GET /api/periods/state
#[utoipa::path(
    get,
    path = "/api/periods/state",
    tag = "Periods",
    params(PeriodStateQuery),
    responses(
        (status = 200, description = "Current period state", body = PeriodStateResponse),
        (status = 404, description = "Outlet not found")
    )
)]
pub async fn get_period_state(
    State(app_state): State<AppState>,
    Query(query): Query<PeriodStateQuery>,
) -> Result<impl IntoResponse, AppError> {
    let outlet = load_outlet(&app_state, query.outlet_id).await?;
    let trading_date = query.trading_date.unwrap_or_else(|| app_state.trading_today());

    let state = app_state.periods.state(outlet.id, trading_date).await?;
    Ok((
        StatusCode::OK,
        Json(PeriodStateResponse {
            trading_date,
            state,
        }),
    ))
}
