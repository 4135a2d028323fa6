//! Business logic services

pub mod audit;
pub mod auth;
pub mod fines;
pub mod loans;
pub mod materials;
pub mod reservations;
pub mod settings;
pub mod users;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub materials: materials::MaterialsService,
    pub loans: loans::LoansService,
    pub fines: fines::FinesService,
    pub reservations: reservations::ReservationsService,
    pub settings: settings::SettingsService,
    pub audit: audit::AuditService,
}

impl Services {
    /// Create all services with the given repository.
    /// Must run inside the tokio runtime: the audit service spawns its writer task.
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        let settings = settings::SettingsService::new(repository.clone());
        let fines = fines::FinesService::new(repository.clone(), settings.clone());
        let reservations = reservations::ReservationsService::new(repository.clone());
        let loans = loans::LoansService::new(
            repository.clone(),
            fines.clone(),
            reservations.clone(),
        );

        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            users: users::UsersService::new(repository.clone()),
            materials: materials::MaterialsService::new(repository.clone()),
            loans,
            fines,
            reservations,
            settings,
            audit: audit::AuditService::new(repository),
        }
    }
}
