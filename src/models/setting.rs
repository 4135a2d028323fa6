//! Settings model (singleton record, lazily created with defaults)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: i32,
    pub max_fines_limit: i32,
    pub block_duration_days: i32,
    pub updated_at: DateTime<Utc>,
}

/// Update settings request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSetting {
    #[validate(range(min = 1, message = "Fine limit must be at least 1"))]
    pub max_fines_limit: Option<i32>,
    #[validate(range(min = 1, message = "Block duration must be at least 1 day"))]
    pub block_duration_days: Option<i32>,
}
