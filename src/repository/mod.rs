//! Repository layer for database operations

pub mod audit_logs;
pub mod fines;
pub mod loans;
pub mod materials;
pub mod reservations;
pub mod settings;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::error::AppError;

/// Main repository struct holding the database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub materials: materials::MaterialsRepository,
    pub loans: loans::LoansRepository,
    pub fines: fines::FinesRepository,
    pub reservations: reservations::ReservationsRepository,
    pub settings: settings::SettingsRepository,
    pub audit_logs: audit_logs::AuditLogsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            materials: materials::MaterialsRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            fines: fines::FinesRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            settings: settings::SettingsRepository::new(pool.clone()),
            audit_logs: audit_logs::AuditLogsRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Map a Postgres unique-constraint violation to Conflict, anything else
/// to a database error. Covers races the service-level existence checks miss.
pub(crate) fn unique_violation(err: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23505") {
            return AppError::Conflict(message.to_string());
        }
    }
    AppError::Database(err)
}

/// Map a Postgres foreign-key violation to InvalidState
pub(crate) fn fk_violation(err: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23503") {
            return AppError::InvalidState(message.to_string());
        }
    }
    AppError::Database(err)
}
