// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

// The engine's error taxonomy. Validation and state conflicts carry enough
// detail for the operator to correct the input; everything else collapses
// into a generic retryable failure at the HTTP boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("trading day {date} is locked for outlet {outlet}")]
    PeriodLocked { outlet: String, date: NaiveDate },

    #[error("closing quantity for '{item_key}' exceeds available stock (maximum allowed: {max_allowed})")]
    ExceedsAvailable { item_key: String, max_allowed: Decimal },

    #[error("unknown item '{0}'")]
    ItemNotFound(String),

    #[error("unit mismatch for '{item_key}': expected '{expected}'")]
    UnitMismatch { item_key: String, expected: String },

    #[error("outlet not found")]
    OutletNotFound,

    #[error("deposit not found")]
    DepositNotFound,

    #[error("database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("internal server error")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Return every field-level detail so the caller can fix the payload.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // State conflicts: specific reason, no automatic retry.
            AppError::PeriodLocked { ref outlet, date } => {
                let body = Json(json!({
                    "error": format!("Trading day {date} is locked for outlet {outlet}."),
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }
            AppError::ExceedsAvailable { ref item_key, max_allowed } => {
                // The computed maximum goes back to the operator verbatim.
                let body = Json(json!({
                    "error": format!(
                        "Closing quantity for '{item_key}' exceeds available stock."
                    ),
                    "maxAllowed": max_allowed,
                }));
                return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
            }

            AppError::ItemNotFound(ref key) => {
                let body = Json(json!({ "error": format!("Unknown item '{key}'.") }));
                return (StatusCode::NOT_FOUND, body).into_response();
            }
            AppError::UnitMismatch { ref item_key, ref expected } => {
                let body = Json(json!({
                    "error": format!("Unit mismatch for '{item_key}': expected '{expected}'."),
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::OutletNotFound => (StatusCode::NOT_FOUND, "Outlet not found."),
            AppError::DepositNotFound => (StatusCode::NOT_FOUND, "Deposit not found."),

            // Infrastructure failures are logged in full and surfaced generically.
            ref e => {
                tracing::error!("internal server error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An unexpected error occurred. Please retry.")
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
