//! Loan model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::{material::MaterialShort, user::UserShort, ListParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "loan_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    Returned,
    Overdue,
}

/// Loan record linking a user to a material for a bounded period
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub material_id: i32,
    pub responsible_staff_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub return_condition: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Loan with embedded borrower, material and staff projections
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetails {
    #[serde(flatten)]
    pub loan: Loan,
    pub user: UserShort,
    pub material: MaterialShort,
    pub responsible_staff: UserShort,
}

/// Loan list query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuery {
    pub user_id: Option<i32>,
    pub material_id: Option<i32>,
    pub status: Option<LoanStatus>,
    /// Forces status=active AND dueDate < now
    pub overdue: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

const SORTABLE: &[(&str, &str)] = &[
    ("id", "l.id"),
    ("loanDate", "l.loan_date"),
    ("dueDate", "l.due_date"),
    ("returnDate", "l.return_date"),
    ("status", "l.status"),
    ("createdAt", "l.created_at"),
];

impl LoanQuery {
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

/// Create loan request; the responsible staff member comes from the token
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLoan {
    #[validate(range(min = 1, message = "Invalid user id"))]
    pub user_id: i32,
    #[validate(range(min = 1, message = "Invalid material id"))]
    pub material_id: i32,
    pub due_date: DateTime<Utc>,
}

/// Return loan request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLoan {
    pub return_condition: Option<String>,
}
