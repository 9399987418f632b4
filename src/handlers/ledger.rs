// src/handlers/ledger.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{load_outlet, validate_not_negative, validate_positive},
    models::ledger::{Deposit, DepositStatus, Expense, ExternalPayment, PaymentStatus},
};

// ---
// Payload: PostDeposit
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDepositPayload {
    pub outlet_id: Uuid,

    #[schema(value_type = Option<String>, format = Date)]
    pub trading_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,

    /// Reference code from the confirmation message, if any.
    pub code: Option<String>,

    pub note: Option<String>,
}

// POST /api/ledger/deposits
#[utoipa::path(
    post,
    path = "/api/ledger/deposits",
    tag = "Ledger",
    request_body = PostDepositPayload,
    responses(
        (status = 201, description = "Deposit recorded", body = Deposit),
        (status = 404, description = "Outlet not found"),
        (status = 409, description = "Trading day already locked")
    )
)]
pub async fn post_deposit(
    State(app_state): State<AppState>,
    Json(payload): Json<PostDepositPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outlet = load_outlet(&app_state, payload.outlet_id).await?;
    let trading_date = payload.trading_date.unwrap_or_else(|| app_state.trading_today());

    let deposit = app_state
        .ledger
        .post_deposit(
            &outlet,
            trading_date,
            payload.amount,
            payload.code.as_deref(),
            payload.note.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(deposit)))
}

// ---
// Payload: SetDepositStatus (admin override)
// ---

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetDepositStatusPayload {
    pub status: DepositStatus,
}

// PATCH /api/ledger/deposits/{id}/status
#[utoipa::path(
    patch,
    path = "/api/ledger/deposits/{id}/status",
    tag = "Ledger",
    request_body = SetDepositStatusPayload,
    params(("id" = Uuid, Path, description = "Deposit ID")),
    responses(
        (status = 200, description = "Status updated", body = Deposit),
        (status = 404, description = "Deposit not found")
    )
)]
pub async fn set_deposit_status(
    State(app_state): State<AppState>,
    Path(deposit_id): Path<Uuid>,
    Json(payload): Json<SetDepositStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let deposit = app_state
        .ledger
        .set_deposit_status(deposit_id, payload.status)
        .await?;
    Ok((StatusCode::OK, Json(deposit)))
}

// ---
// Payload: PostExpense
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostExpensePayload {
    pub outlet_id: Uuid,

    #[schema(value_type = Option<String>, format = Date)]
    pub trading_date: Option<NaiveDate>,

    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,

    #[validate(length(min = 1, message = "A note describing the expense is required."))]
    pub note: String,
}

// POST /api/ledger/expenses
#[utoipa::path(
    post,
    path = "/api/ledger/expenses",
    tag = "Ledger",
    request_body = PostExpensePayload,
    responses(
        (status = 201, description = "Expense recorded", body = Expense),
        (status = 404, description = "Outlet not found"),
        (status = 409, description = "Trading day already locked")
    )
)]
pub async fn post_expense(
    State(app_state): State<AppState>,
    Json(payload): Json<PostExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outlet = load_outlet(&app_state, payload.outlet_id).await?;
    let trading_date = payload.trading_date.unwrap_or_else(|| app_state.trading_today());

    let expense = app_state
        .ledger
        .post_expense(&outlet, trading_date, payload.amount, Some(&payload.note))
        .await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

// ---
// Payload: payment provider callback
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCallbackPayload {
    pub outlet_id: Uuid,

    #[validate(custom(function = "validate_not_negative"))]
    pub amount: Decimal,

    pub status: PaymentStatus,
    pub reference: Option<String>,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecorded {
    pub payment: ExternalPayment,
    /// Whether the payment falls inside the outlet's current trading window.
    pub attributed: bool,
}

// POST /api/payments/callback
#[utoipa::path(
    post,
    path = "/api/payments/callback",
    tag = "Ledger",
    request_body = PaymentCallbackPayload,
    responses(
        (status = 200, description = "Payment fact stored", body = PaymentRecorded),
        (status = 404, description = "Outlet not found")
    )
)]
pub async fn payment_callback(
    State(app_state): State<AppState>,
    Json(payload): Json<PaymentCallbackPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // The webhook is keyed by outlet ID directly; a bad ID is the only
    // rejection this endpoint knows.
    let outlet = load_outlet(&app_state, payload.outlet_id).await?;

    let (payment, attributed) = app_state
        .ledger
        .record_external_payment(
            outlet.id,
            payload.amount,
            payload.status,
            payload.reference.as_deref(),
            payload.paid_at,
        )
        .await?;

    Ok((StatusCode::OK, Json(PaymentRecorded { payment, attributed })))
}
