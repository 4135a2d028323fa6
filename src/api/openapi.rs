//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{audit_logs, auth, fines, health, loans, materials, reservations, settings, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "LabLend API",
        version = "1.0.0",
        description = "Laboratory material lending administration REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::refresh,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Materials
        materials::list_materials,
        materials::get_material,
        materials::create_material,
        materials::update_material,
        materials::delete_material,
        // Loans
        loans::list_loans,
        loans::get_loan,
        loans::create_loan,
        loans::return_loan,
        loans::process_overdue,
        // Fines
        fines::list_fines,
        fines::get_fine,
        fines::get_user_fines,
        fines::create_fine,
        fines::update_fine,
        fines::delete_fine,
        // Reservations
        reservations::list_reservations,
        reservations::create_reservation,
        reservations::cancel_reservation,
        // Settings
        settings::get_settings,
        settings::update_settings,
        // Audit logs
        audit_logs::list_audit_logs,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::RefreshRequest,
            auth::RefreshData,
            crate::services::auth::LoginData,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::UserType,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Materials
            crate::models::material::Material,
            crate::models::material::MaterialShort,
            crate::models::material::MaterialType,
            crate::models::material::ConditionStatus,
            crate::models::material::CreateMaterial,
            crate::models::material::UpdateMaterial,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::LoanStatus,
            crate::models::loan::CreateLoan,
            crate::models::loan::ReturnLoan,
            // Fines
            crate::models::fine::Fine,
            crate::models::fine::FineDetails,
            crate::models::fine::FineReason,
            crate::models::fine::CreateFine,
            crate::models::fine::UpdateFine,
            // Reservations
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationDetails,
            crate::models::reservation::CreateReservation,
            // Settings
            crate::models::setting::Setting,
            crate::models::setting::UpdateSetting,
            // Audit logs
            crate::models::audit_log::AuditLog,
            crate::models::audit_log::AuditLogDetails,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "materials", description = "Catalog material management"),
        (name = "loans", description = "Loan management"),
        (name = "fines", description = "Fine management"),
        (name = "reservations", description = "Reservation queue"),
        (name = "settings", description = "Lending policy settings"),
        (name = "audit-logs", description = "Audit trail")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
