// src/models/outlet.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Outlet {
    pub id: Uuid,

    #[schema(example = "Kahawa West Butchery")]
    pub name: String,

    #[schema(example = "KHW")]
    pub code: String,

    /// When true, gross till payments are netted off the day's
    /// amount-to-deposit (the outlet banks through the till instead of cash).
    pub uses_till_netting: bool,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supervisor {
    pub id: Uuid,

    #[schema(ignore)]
    pub outlet_id: Uuid,

    #[schema(example = "SUP-01")]
    pub code: String,

    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
