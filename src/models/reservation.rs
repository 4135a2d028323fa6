//! Reservation queue model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{material::MaterialShort, user::UserShort, ListParams};

/// Queued request for a material that is out of available stock.
/// Queue order is priorityLevel descending, then createdAt ascending.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i32,
    pub material_id: i32,
    pub user_id: i32,
    pub priority_level: i32,
    pub created_at: DateTime<Utc>,
}

/// Reservation with embedded user and material projections
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetails {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub user: UserShort,
    pub material: MaterialShort,
}

/// Reservation list query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ReservationQuery {
    pub user_id: Option<i32>,
    pub material_id: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

const SORTABLE: &[(&str, &str)] = &[
    ("id", "r.id"),
    ("priorityLevel", "r.priority_level"),
    ("createdAt", "r.created_at"),
];

impl ReservationQuery {
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

/// Create reservation request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservation {
    #[validate(range(min = 1, message = "Invalid material id"))]
    pub material_id: i32,
    #[validate(range(min = 1, message = "Invalid user id"))]
    pub user_id: i32,
    /// Defaults to 1 for professors, 0 otherwise
    pub priority_level: Option<i32>,
}
