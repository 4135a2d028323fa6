//! LabLend Laboratory Lending Management System
//!
//! A Rust REST API server for administering lab-material lending: users,
//! a catalog of lendable materials, loans, disciplinary fines and a
//! priority-ordered reservation queue.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
