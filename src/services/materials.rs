//! Materials (catalog) service

use crate::{
    error::{AppError, AppResult},
    models::material::{CreateMaterial, Material, MaterialQuery, UpdateMaterial},
    repository::Repository,
};

#[derive(Clone)]
pub struct MaterialsService {
    repository: Repository,
}

impl MaterialsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self, id: i32) -> AppResult<Material> {
        self.repository.materials.get_by_id(id).await
    }

    pub async fn list(&self, query: &MaterialQuery) -> AppResult<(Vec<Material>, i64)> {
        self.repository.materials.search(query).await
    }

    pub async fn create(&self, material: &CreateMaterial) -> AppResult<Material> {
        if material.quantity_available > material.quantity_total {
            return Err(AppError::InvalidState(
                "Available quantity cannot exceed total quantity".to_string(),
            ));
        }
        if self
            .repository
            .materials
            .internal_code_exists(&material.internal_code)
            .await?
        {
            return Err(AppError::Conflict(
                "Internal code already registered".to_string(),
            ));
        }

        self.repository.materials.create(material).await
    }

    pub async fn update(&self, id: i32, update: &UpdateMaterial) -> AppResult<Material> {
        let current = self.repository.materials.get_by_id(id).await?;

        // Quantities may be updated independently; check the pair they form together
        let total = update.quantity_total.unwrap_or(current.quantity_total);
        let available = update.quantity_available.unwrap_or(current.quantity_available);
        if available > total {
            return Err(AppError::InvalidState(
                "Available quantity cannot exceed total quantity".to_string(),
            ));
        }

        self.repository.materials.update(id, update).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if self.repository.materials.has_active_loans(id).await? {
            return Err(AppError::InvalidState(
                "Material has active loans".to_string(),
            ));
        }
        self.repository.materials.delete(id).await
    }
}
