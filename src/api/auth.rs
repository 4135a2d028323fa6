//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{error::AppResult, services::auth::LoginData, AppState};

use super::ApiResponse;

/// Login request
#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh token request
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Re-issued access token
#[derive(Serialize, ToSchema)]
pub struct RefreshData {
    pub token: String,
}

/// Authenticate and receive access and refresh tokens
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginData),
        (status = 401, description = "Invalid credentials or inactive account"),
        (status = 403, description = "Account is blocked")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginData>>> {
    request.validate()?;

    let data = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;

    state.services.audit.record(
        Some(data.user.id),
        "auth",
        "login",
        serde_json::json!({ "email": data.user.email }),
    );

    Ok(Json(ApiResponse::new(data)))
}

/// Exchange a valid refresh token for a new access token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token issued", body = RefreshData),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> AppResult<Json<ApiResponse<RefreshData>>> {
    let token = state.services.auth.refresh(&request.refresh_token).await?;
    Ok(Json(ApiResponse::new(RefreshData { token })))
}
