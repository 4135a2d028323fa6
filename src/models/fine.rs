//! Fine (disciplinary mark) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{user::UserShort, ListParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "fine_reason", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FineReason {
    LateReturn,
    DamagedMaterial,
    RuleViolation,
}

/// Fine record; deactivating one never reverses its effect on the
/// borrower's fine count (historical record)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Fine {
    pub id: i32,
    pub user_id: i32,
    pub loan_id: Option<i32>,
    pub reason: FineReason,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fine with embedded user projection
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FineDetails {
    #[serde(flatten)]
    pub fine: Fine,
    pub user: UserShort,
}

/// Fine list query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct FineQuery {
    pub user_id: Option<i32>,
    pub loan_id: Option<i32>,
    pub is_active: Option<bool>,
    pub reason: Option<FineReason>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

const SORTABLE: &[(&str, &str)] = &[
    ("id", "f.id"),
    ("reason", "f.reason"),
    ("isActive", "f.is_active"),
    ("createdAt", "f.created_at"),
];

impl FineQuery {
    pub fn list_params(&self) -> ListParams {
        ListParams::new(
            self.page,
            self.limit,
            self.sort_by.as_deref(),
            self.sort_order.as_deref(),
            SORTABLE,
        )
    }
}

fn default_true() -> bool {
    true
}

/// Create fine request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFine {
    #[validate(range(min = 1, message = "Invalid user id"))]
    pub user_id: i32,
    pub loan_id: Option<i32>,
    pub reason: FineReason,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Update fine request; setting isActive=false does not decrement the
/// user's fine count or lift a block
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFine {
    pub description: Option<String>,
    pub is_active: Option<bool>,
}
