//! Fine management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::fine::{CreateFine, Fine, FineDetails, FineQuery, UpdateFine},
    AppState,
};

use super::{ApiResponse, AuthenticatedUser, PaginatedResponse};

/// List fines
#[utoipa::path(
    get,
    path = "/fines",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(FineQuery),
    responses(
        (status = 200, description = "Paginated list of fines"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_fines(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<FineQuery>,
) -> AppResult<Json<PaginatedResponse<FineDetails>>> {
    let (fines, total) = state.services.fines.list(&query).await?;
    Ok(Json(PaginatedResponse::new(fines, &query.list_params(), total)))
}

/// Get a single fine
#[utoipa::path(
    get,
    path = "/fines/{id}",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fine ID")),
    responses(
        (status = 200, description = "Fine found", body = FineDetails),
        (status = 404, description = "Fine not found")
    )
)]
pub async fn get_fine(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<FineDetails>>> {
    let fine = state.services.fines.get(id).await?;
    Ok(Json(ApiResponse::new(fine)))
}

/// Active fines for one user
#[utoipa::path(
    get,
    path = "/fines/user/{userId}",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("userId" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User's active fines", body = Vec<Fine>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_fines(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<ApiResponse<Vec<Fine>>>> {
    let fines = state.services.fines.list_active_for_user(user_id).await?;
    Ok(Json(ApiResponse::new(fines)))
}

/// Record a fine against a user
#[utoipa::path(
    post,
    path = "/fines",
    tag = "fines",
    security(("bearer_auth" = [])),
    request_body = CreateFine,
    responses(
        (status = 201, description = "Fine created", body = Fine),
        (status = 403, description = "Insufficient role"),
        (status = 404, description = "User or loan not found")
    )
)]
pub async fn create_fine(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateFine>,
) -> AppResult<(StatusCode, Json<ApiResponse<Fine>>)> {
    claims.require_staff()?;
    request.validate()?;

    let fine = state.services.fines.create(&request).await?;

    state.services.audit.record(
        Some(claims.id),
        "fines",
        "create",
        serde_json::json!({ "id": fine.id, "userId": fine.user_id, "reason": fine.reason }),
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::new(fine))))
}

/// Update a fine's description or active flag
#[utoipa::path(
    put,
    path = "/fines/{id}",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fine ID")),
    request_body = UpdateFine,
    responses(
        (status = 200, description = "Fine updated", body = Fine),
        (status = 404, description = "Fine not found")
    )
)]
pub async fn update_fine(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateFine>,
) -> AppResult<Json<ApiResponse<Fine>>> {
    claims.require_staff()?;

    let fine = state.services.fines.update(id, &request).await?;

    state.services.audit.record(
        Some(claims.id),
        "fines",
        "update",
        serde_json::json!({ "id": id }),
    );

    Ok(Json(ApiResponse::new(fine)))
}

/// Delete a fine
#[utoipa::path(
    delete,
    path = "/fines/{id}",
    tag = "fines",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Fine ID")),
    responses(
        (status = 204, description = "Fine deleted"),
        (status = 403, description = "Technician role required"),
        (status = 404, description = "Fine not found")
    )
)]
pub async fn delete_fine(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_technician()?;

    state.services.fines.delete(id).await?;

    state.services.audit.record(
        Some(claims.id),
        "fines",
        "delete",
        serde_json::json!({ "id": id }),
    );

    Ok(StatusCode::NO_CONTENT)
}
