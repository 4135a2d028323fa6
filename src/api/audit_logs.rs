//! Audit log endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::audit_log::{AuditLogDetails, AuditLogQuery},
    AppState,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List audit logs
#[utoipa::path(
    get,
    path = "/audit-logs",
    tag = "audit-logs",
    security(("bearer_auth" = [])),
    params(AuditLogQuery),
    responses(
        (status = 200, description = "Paginated list of audit records"),
        (status = 403, description = "Technician role required")
    )
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AuditLogQuery>,
) -> AppResult<Json<PaginatedResponse<AuditLogDetails>>> {
    claims.require_technician()?;

    let (logs, total) = state.services.audit.list(&query).await?;
    Ok(Json(PaginatedResponse::new(logs, &query.list_params(), total)))
}
