//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, Loan, LoanDetails, LoanQuery, ReturnLoan},
    AppState,
};

use super::{ApiResponse, AuthenticatedUser, PaginatedResponse};

/// List loans
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Paginated list of loans with borrower and material details"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_loans(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<LoanDetails>>> {
    let (loans, total) = state.services.loans.list(&query).await?;
    Ok(Json(PaginatedResponse::new(loans, &query.list_params(), total)))
}

/// Get a single loan
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan found", body = LoanDetails),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<LoanDetails>>> {
    let loan = state.services.loans.get(id).await?;
    Ok(Json(ApiResponse::new(loan)))
}

/// Check a material out to a user
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 400, description = "User inactive or blocked, material unavailable, or duplicate active loan"),
        (status = 404, description = "User or material not found")
    )
)]
pub async fn create_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateLoan>,
) -> AppResult<(StatusCode, Json<ApiResponse<LoanDetails>>)> {
    claims.require_staff()?;
    request.validate()?;

    let loan = state.services.loans.create(claims.id, &request).await?;

    state.services.audit.record(
        Some(claims.id),
        "loans",
        "create",
        serde_json::json!({
            "id": loan.loan.id,
            "userId": loan.loan.user_id,
            "materialId": loan.loan.material_id,
        }),
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::new(loan))))
}

/// Return a loaned material
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = ReturnLoan,
    responses(
        (status = 200, description = "Material returned", body = LoanDetails),
        (status = 400, description = "Loan already returned"),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn return_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<ReturnLoan>,
) -> AppResult<Json<ApiResponse<LoanDetails>>> {
    claims.require_staff()?;

    let loan = state.services.loans.return_loan(id, &request).await?;

    state.services.audit.record(
        Some(claims.id),
        "loans",
        "return",
        serde_json::json!({ "id": id, "returnCondition": request.return_condition }),
    );

    Ok(Json(ApiResponse::new(loan)))
}

/// Sweep expired active loans, marking them overdue and fining borrowers
#[utoipa::path(
    post,
    path = "/loans/process-overdue",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Loans processed in this sweep"),
        (status = 403, description = "Technician role required")
    )
)]
pub async fn process_overdue(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<Loan>>>> {
    claims.require_technician()?;

    let processed = state.services.loans.sweep_overdue().await?;

    state.services.audit.record(
        Some(claims.id),
        "loans",
        "process_overdue",
        serde_json::json!({ "count": processed.len() }),
    );

    Ok(Json(ApiResponse::new(processed)))
}
