// src/handlers/admin.rs
//
// Thin directory setup endpoints: outlets, catalogue items and supervisor
// assignments. Kept minimal; the engine proper lives behind the stock,
// ledger and period routes.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::{load_outlet, validate_not_negative},
    models::{
        outlet::{Outlet, Supervisor},
        stock::Item,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOutletPayload {
    #[validate(length(min = 1, message = "The outlet name is required."))]
    pub name: String,

    #[validate(length(min = 1, message = "The outlet code is required."))]
    pub code: String,

    #[serde(default)]
    pub uses_till_netting: bool,
}

// POST /api/admin/outlets
#[utoipa::path(
    post,
    path = "/api/admin/outlets",
    tag = "Admin",
    request_body = CreateOutletPayload,
    responses((status = 201, description = "Outlet created", body = Outlet))
)]
pub async fn create_outlet(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateOutletPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outlet = app_state
        .outlets
        .create_outlet(&payload.name, &payload.code, payload.uses_till_netting)
        .await?;
    Ok((StatusCode::CREATED, Json(outlet)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemPayload {
    #[validate(length(min = 1, message = "The item key is required."))]
    pub item_key: String,

    #[validate(length(min = 1, message = "The item name is required."))]
    pub name: String,

    #[validate(length(min = 1, message = "The unit is required."))]
    pub unit: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub default_sell_price: Decimal,
}

// POST /api/admin/items
#[utoipa::path(
    post,
    path = "/api/admin/items",
    tag = "Admin",
    request_body = CreateItemPayload,
    responses((status = 201, description = "Item created", body = Item))
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateItemPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let item = app_state
        .pricing
        .create_item(
            &payload.item_key,
            &payload.name,
            &payload.unit,
            payload.default_sell_price,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupervisorPayload {
    pub outlet_id: Uuid,

    #[validate(length(min = 1, message = "The supervisor code is required."))]
    pub code: String,

    #[validate(length(min = 1, message = "The supervisor name is required."))]
    pub name: String,
}

// POST /api/admin/supervisors
#[utoipa::path(
    post,
    path = "/api/admin/supervisors",
    tag = "Admin",
    request_body = CreateSupervisorPayload,
    responses(
        (status = 201, description = "Supervisor assigned to the outlet", body = Supervisor),
        (status = 404, description = "Outlet not found")
    )
)]
pub async fn create_supervisor(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateSupervisorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outlet = load_outlet(&app_state, payload.outlet_id).await?;
    let supervisor = app_state
        .outlets
        .create_supervisor(outlet.id, &payload.code, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(supervisor)))
}
