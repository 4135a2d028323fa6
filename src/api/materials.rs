//! Catalog material endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::material::{CreateMaterial, Material, MaterialQuery, UpdateMaterial},
    AppState,
};

use super::{ApiResponse, AuthenticatedUser, PaginatedResponse};

/// List catalog materials
#[utoipa::path(
    get,
    path = "/materials",
    tag = "materials",
    security(("bearer_auth" = [])),
    params(MaterialQuery),
    responses(
        (status = 200, description = "Paginated list of materials"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_materials(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<MaterialQuery>,
) -> AppResult<Json<PaginatedResponse<Material>>> {
    let (materials, total) = state.services.materials.list(&query).await?;
    Ok(Json(PaginatedResponse::new(
        materials,
        &query.list_params(),
        total,
    )))
}

/// Get a single material
#[utoipa::path(
    get,
    path = "/materials/{id}",
    tag = "materials",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Material found", body = Material),
        (status = 404, description = "Material not found")
    )
)]
pub async fn get_material(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Material>>> {
    let material = state.services.materials.get(id).await?;
    Ok(Json(ApiResponse::new(material)))
}

/// Add a material to the catalog
#[utoipa::path(
    post,
    path = "/materials",
    tag = "materials",
    security(("bearer_auth" = [])),
    request_body = CreateMaterial,
    responses(
        (status = 201, description = "Material created", body = Material),
        (status = 400, description = "Validation error, duplicate code or inconsistent quantities"),
        (status = 403, description = "Insufficient role")
    )
)]
pub async fn create_material(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateMaterial>,
) -> AppResult<(StatusCode, Json<ApiResponse<Material>>)> {
    claims.require_staff()?;
    request.validate()?;

    let material = state.services.materials.create(&request).await?;

    state.services.audit.record(
        Some(claims.id),
        "materials",
        "create",
        serde_json::json!({ "id": material.id, "internalCode": material.internal_code }),
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::new(material))))
}

/// Update an existing material
#[utoipa::path(
    put,
    path = "/materials/{id}",
    tag = "materials",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Material ID")),
    request_body = UpdateMaterial,
    responses(
        (status = 200, description = "Material updated", body = Material),
        (status = 400, description = "Inconsistent quantities"),
        (status = 404, description = "Material not found")
    )
)]
pub async fn update_material(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateMaterial>,
) -> AppResult<Json<ApiResponse<Material>>> {
    claims.require_staff()?;
    request.validate()?;

    let material = state.services.materials.update(id, &request).await?;

    state.services.audit.record(
        Some(claims.id),
        "materials",
        "update",
        serde_json::json!({ "id": id }),
    );

    Ok(Json(ApiResponse::new(material)))
}

/// Remove a material from the catalog
#[utoipa::path(
    delete,
    path = "/materials/{id}",
    tag = "materials",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Material ID")),
    responses(
        (status = 204, description = "Material deleted"),
        (status = 400, description = "Material has active loans"),
        (status = 403, description = "Technician role required"),
        (status = 404, description = "Material not found")
    )
)]
pub async fn delete_material(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_technician()?;

    state.services.materials.delete(id).await?;

    state.services.audit.record(
        Some(claims.id),
        "materials",
        "delete",
        serde_json::json!({ "id": id }),
    );

    Ok(StatusCode::NO_CONTENT)
}
