// src/handlers/reports.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::load_outlet,
    models::{commission::CommissionRecord, reporting::HeaderTotals},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DayQuery {
    pub outlet_id: Uuid,

    #[param(value_type = Option<String>, format = Date)]
    pub trading_date: Option<NaiveDate>,
}

// GET /api/reports/header
#[utoipa::path(
    get,
    path = "/api/reports/header",
    tag = "Reports",
    params(DayQuery),
    responses(
        (status = 200, description = "Header totals for the day, carryover included", body = HeaderTotals),
        (status = 404, description = "Outlet not found")
    )
)]
pub async fn get_header_totals(
    State(app_state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<impl IntoResponse, AppError> {
    let outlet = load_outlet(&app_state, query.outlet_id).await?;
    let trading_date = query.trading_date.unwrap_or_else(|| app_state.trading_today());

    let totals = app_state.reporting.header_totals(&outlet, trading_date).await?;
    Ok((StatusCode::OK, Json(totals)))
}

// GET /api/reports/commissions
#[utoipa::path(
    get,
    path = "/api/reports/commissions",
    tag = "Reports",
    params(DayQuery),
    responses(
        (status = 200, description = "Commission records for the day", body = Vec<CommissionRecord>),
        (status = 404, description = "Outlet not found")
    )
)]
pub async fn get_commissions(
    State(app_state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<impl IntoResponse, AppError> {
    let outlet = load_outlet(&app_state, query.outlet_id).await?;
    let trading_date = query.trading_date.unwrap_or_else(|| app_state.trading_today());

    let records = app_state
        .commissions
        .for_day(outlet.id, trading_date)
        .await?;
    Ok((StatusCode::OK, Json(records)))
}
