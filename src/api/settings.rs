//! Lending policy settings endpoints

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::setting::{Setting, UpdateSetting},
    AppState,
};

use super::{ApiResponse, AuthenticatedUser};

/// Current lending policy
#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current settings", body = Setting),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_settings(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Setting>>> {
    let settings = state.services.settings.get().await?;
    Ok(Json(ApiResponse::new(settings)))
}

/// Update the lending policy
#[utoipa::path(
    put,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body = UpdateSetting,
    responses(
        (status = 200, description = "Settings updated", body = Setting),
        (status = 403, description = "Technician role required")
    )
)]
pub async fn update_settings(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<UpdateSetting>,
) -> AppResult<Json<ApiResponse<Setting>>> {
    claims.require_technician()?;
    request.validate()?;

    let settings = state.services.settings.update(&request).await?;

    state.services.audit.record(
        Some(claims.id),
        "settings",
        "update",
        serde_json::json!({
            "maxFinesLimit": settings.max_fines_limit,
            "blockDurationDays": settings.block_duration_days,
        }),
    );

    Ok(Json(ApiResponse::new(settings)))
}
