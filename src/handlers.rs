pub mod admin;
pub mod ledger;
pub mod periods;
pub mod reports;
pub mod stock;

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::ValidationError;

use crate::{common::error::AppError, config::AppState, models::outlet::Outlet};

// ---
// Shared helpers
// ---

pub(crate) async fn load_outlet(app_state: &AppState, outlet_id: Uuid) -> Result<Outlet, AppError> {
    app_state
        .outlets
        .get_outlet(outlet_id)
        .await?
        .ok_or(AppError::OutletNotFound)
}

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("The value cannot be negative.".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("The value must be greater than zero.".into());
        return Err(err);
    }
    Ok(())
}
