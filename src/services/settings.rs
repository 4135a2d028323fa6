//! Lending policy settings service

use crate::{
    error::AppResult,
    models::setting::{Setting, UpdateSetting},
    repository::Repository,
};

#[derive(Clone)]
pub struct SettingsService {
    repository: Repository,
}

impl SettingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Current settings, created with defaults on first access
    pub async fn get(&self) -> AppResult<Setting> {
        self.repository.settings.get_or_create().await
    }

    pub async fn update(&self, update: &UpdateSetting) -> AppResult<Setting> {
        self.repository.settings.update(update).await
    }
}
