//! API handlers for the lending REST endpoints

pub mod audit_logs;
pub mod auth;
pub mod fines;
pub mod health;
pub mod loans;
pub mod materials;
pub mod openapi;
pub mod reservations;
pub mod settings;
pub mod users;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Serialize;

use crate::{error::AppError, models::user::UserClaims, models::ListParams, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| {
                AppError::Unauthorized("Invalid authorization header format".to_string())
            })?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Uniform success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Pagination block attached to list responses
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// Success envelope for list endpoints
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, params: &ListParams, total: i64) -> Self {
        Self {
            success: true,
            data,
            pagination: Pagination {
                page: params.page,
                limit: params.limit,
                total,
                total_pages: crate::models::total_pages(total, params.limit),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginated_envelope_computes_page_count() {
        let params = ListParams::new(Some(2), Some(10), None, None, &[("id", "id")]);
        let response = PaginatedResponse::new(vec![1, 2, 3], &params, 25);
        assert!(response.success);
        assert_eq!(response.pagination.page, 2);
        assert_eq!(response.pagination.total, 25);
        assert_eq!(response.pagination.total_pages, 3);
    }

    #[test]
    fn pagination_serializes_camel_case() {
        let pagination = Pagination {
            page: 1,
            limit: 10,
            total: 0,
            total_pages: 0,
        };
        let json = serde_json::to_value(&pagination).unwrap();
        assert!(json.get("totalPages").is_some());
    }
}
