//! Reservation queue service

use crate::{
    error::{AppError, AppResult},
    models::{
        reservation::{CreateReservation, ReservationDetails, ReservationQuery},
        user::UserType,
    },
    repository::Repository,
};

/// Professors queue ahead of students and technicians by default
pub fn default_priority(user_type: UserType) -> i32 {
    match user_type {
        UserType::Professor => 1,
        UserType::Student | UserType::Technician => 0,
    }
}

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
}

impl ReservationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(
        &self,
        query: &ReservationQuery,
    ) -> AppResult<(Vec<ReservationDetails>, i64)> {
        self.repository.reservations.search(query).await
    }

    /// Queue a reservation. Only permitted while the material is out of stock.
    pub async fn create(&self, request: &CreateReservation) -> AppResult<ReservationDetails> {
        let user = self.repository.users.get_by_id(request.user_id).await?;
        let material = self.repository.materials.get_by_id(request.material_id).await?;

        if material.quantity_available > 0 {
            return Err(AppError::InvalidState(
                "Material is available; no reservation needed".to_string(),
            ));
        }
        if self
            .repository
            .reservations
            .find_by_material_and_user(request.material_id, request.user_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "User already has a reservation for this material".to_string(),
            ));
        }

        let priority = request
            .priority_level
            .unwrap_or_else(|| default_priority(user.user_type));

        let created = self
            .repository
            .reservations
            .create(request.material_id, request.user_id, priority)
            .await?;
        self.repository.reservations.get_details(created.id).await
    }

    pub async fn cancel(&self, id: i32) -> AppResult<()> {
        self.repository.reservations.delete(id).await
    }

    /// Hook invoked after a return. Clears the head-of-queue reservation for
    /// the material; handing the unit to that user remains a manual step.
    /// Best-effort: failures are logged and never surfaced to the caller.
    pub async fn on_material_available(&self, material_id: i32) {
        if let Err(e) = self.clear_queue_head(material_id).await {
            tracing::warn!(material_id, error = %e, "failed to process reservation queue");
        }
    }

    async fn clear_queue_head(&self, material_id: i32) -> AppResult<()> {
        let material = self.repository.materials.get_by_id(material_id).await?;
        if material.quantity_available == 0 {
            return Ok(());
        }

        if let Some(head) = self
            .repository
            .reservations
            .find_next_in_queue(material_id)
            .await?
        {
            self.repository.reservations.delete(head.id).await?;
            tracing::info!(
                material_id,
                user_id = head.user_id,
                reservation_id = head.id,
                "cleared head-of-queue reservation"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn professors_get_elevated_priority() {
        assert_eq!(default_priority(UserType::Professor), 1);
        assert_eq!(default_priority(UserType::Student), 0);
        assert_eq!(default_priority(UserType::Technician), 0);
    }
}
