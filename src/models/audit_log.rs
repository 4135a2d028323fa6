//! Audit log model — append-only observability sink

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::models::{user::UserShort, ListParams};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: i32,
    pub user_id: Option<i32>,
    pub entity: String,
    pub action_type: String,
    /// Serialized request/response snapshot
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Audit log entry with embedded actor projection
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogDetails {
    #[serde(flatten)]
    pub log: AuditLog,
    pub user: Option<UserShort>,
}

/// Audit log list query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub user_id: Option<i32>,
    pub entity: Option<String>,
    pub action_type: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

const SORTABLE: &[(&str, &str)] = &[
    ("id", "a.id"),
    ("entity", "a.entity"),
    ("actionType", "a.action_type"),
    ("createdAt", "a.created_at"),
];

impl AuditLogQuery {
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
