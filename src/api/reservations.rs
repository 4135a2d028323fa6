//! Reservation queue endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::AppResult,
    models::reservation::{CreateReservation, ReservationDetails, ReservationQuery},
    AppState,
};

use super::{ApiResponse, AuthenticatedUser, PaginatedResponse};

/// List reservations
#[utoipa::path(
    get,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(ReservationQuery),
    responses(
        (status = 200, description = "Paginated list of reservations"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<ReservationQuery>,
) -> AppResult<Json<PaginatedResponse<ReservationDetails>>> {
    let (reservations, total) = state.services.reservations.list(&query).await?;
    Ok(Json(PaginatedResponse::new(
        reservations,
        &query.list_params(),
        total,
    )))
}

/// Queue a reservation for an out-of-stock material
#[utoipa::path(
    post,
    path = "/reservations",
    tag = "reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation created", body = ReservationDetails),
        (status = 400, description = "Material still available, or user already queued"),
        (status = 404, description = "User or material not found")
    )
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateReservation>,
) -> AppResult<(StatusCode, Json<ApiResponse<ReservationDetails>>)> {
    request.validate()?;

    let reservation = state.services.reservations.create(&request).await?;

    state.services.audit.record(
        Some(claims.id),
        "reservations",
        "create",
        serde_json::json!({
            "id": reservation.reservation.id,
            "materialId": reservation.reservation.material_id,
            "userId": reservation.reservation.user_id,
        }),
    );

    Ok((StatusCode::CREATED, Json(ApiResponse::new(reservation))))
}

/// Cancel a reservation
#[utoipa::path(
    delete,
    path = "/reservations/{id}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 204, description = "Reservation cancelled"),
        (status = 404, description = "Reservation not found")
    )
)]
pub async fn cancel_reservation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.reservations.cancel(id).await?;

    state.services.audit.record(
        Some(claims.id),
        "reservations",
        "delete",
        serde_json::json!({ "id": id }),
    );

    Ok(StatusCode::NO_CONTENT)
}
