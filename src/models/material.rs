//! Material (catalog) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::ListParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "material_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    Book,
    Handout,
    Article,
    Equipment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "condition_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ConditionStatus {
    New,
    Good,
    Damaged,
    Maintenance,
    Lost,
}

/// Lendable material from the catalog
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: i32,
    pub internal_code: String,
    pub title: String,
    pub thematic_area: String,
    pub material_type: MaterialType,
    pub quantity_total: i32,
    pub quantity_available: i32,
    pub condition_status: ConditionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short material representation embedded in loan/reservation rows
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialShort {
    pub id: i32,
    pub internal_code: String,
    pub title: String,
    pub material_type: MaterialType,
}

/// Material list query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MaterialQuery {
    pub material_type: Option<MaterialType>,
    pub condition_status: Option<ConditionStatus>,
    /// Substring match on thematic area
    pub thematic_area: Option<String>,
    /// Substring match on title, internal code or thematic area
    pub search: Option<String>,
    pub available_only: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

const SORTABLE: &[(&str, &str)] = &[
    ("id", "id"),
    ("internalCode", "internal_code"),
    ("title", "title"),
    ("thematicArea", "thematic_area"),
    ("materialType", "material_type"),
    ("quantityTotal", "quantity_total"),
    ("quantityAvailable", "quantity_available"),
    ("createdAt", "created_at"),
];

impl MaterialQuery {
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

/// Create material request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaterial {
    #[validate(length(min = 1, message = "Internal code is required"))]
    pub internal_code: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Thematic area is required"))]
    pub thematic_area: String,
    pub material_type: MaterialType,
    #[validate(range(min = 1, message = "Total quantity must be positive"))]
    pub quantity_total: i32,
    #[validate(range(min = 0, message = "Available quantity cannot be negative"))]
    pub quantity_available: i32,
    pub condition_status: ConditionStatus,
}

/// Update material request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaterial {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Thematic area cannot be empty"))]
    pub thematic_area: Option<String>,
    pub material_type: Option<MaterialType>,
    #[validate(range(min = 1, message = "Total quantity must be positive"))]
    pub quantity_total: Option<i32>,
    #[validate(range(min = 0, message = "Available quantity cannot be negative"))]
    pub quantity_available: Option<i32>,
    pub condition_status: Option<ConditionStatus>,
}
