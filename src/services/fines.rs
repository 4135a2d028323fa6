//! Fines service: disciplinary marks and the automatic lending block

use chrono::{DateTime, Duration, Utc};

use crate::{
    error::AppResult,
    models::{
        fine::{CreateFine, Fine, FineDetails, FineQuery, FineReason, UpdateFine},
        loan::Loan,
    },
    repository::Repository,
    services::settings::SettingsService,
};

/// Block expiry for a user who just crossed the fine limit
pub fn block_until(now: DateTime<Utc>, block_duration_days: i32) -> DateTime<Utc> {
    now + Duration::days(block_duration_days as i64)
}

#[derive(Clone)]
pub struct FinesService {
    repository: Repository,
    settings: SettingsService,
}

impl FinesService {
    pub fn new(repository: Repository, settings: SettingsService) -> Self {
        Self {
            repository,
            settings,
        }
    }

    pub async fn get(&self, id: i32) -> AppResult<FineDetails> {
        self.repository.fines.get_details(id).await
    }

    pub async fn list(&self, query: &FineQuery) -> AppResult<(Vec<FineDetails>, i64)> {
        self.repository.fines.search(query).await
    }

    /// Active fines for one user
    pub async fn list_active_for_user(&self, user_id: i32) -> AppResult<Vec<Fine>> {
        self.repository.users.get_by_id(user_id).await?;
        self.repository.fines.find_active_by_user(user_id).await
    }

    /// Create a fine. An active fine bumps the user's fine count and,
    /// once the configured limit is reached, sets a lending block.
    pub async fn create(&self, fine: &CreateFine) -> AppResult<Fine> {
        self.repository.users.get_by_id(fine.user_id).await?;
        if let Some(loan_id) = fine.loan_id {
            self.repository.loans.get_by_id(loan_id).await?;
        }

        let created = self.repository.fines.create(fine).await?;
        if created.is_active {
            self.apply_fine_policy(created.user_id).await?;
        }
        Ok(created)
    }

    /// Fine a borrower for a late loan, unless the loan already carries an
    /// active late-return fine (the overdue sweep and a late return can both
    /// reach the same loan).
    pub async fn fine_late_return(&self, loan: &Loan) -> AppResult<Option<Fine>> {
        if self
            .repository
            .fines
            .active_late_return_exists(loan.id)
            .await?
        {
            return Ok(None);
        }

        let created = self
            .repository
            .fines
            .create(&CreateFine {
                user_id: loan.user_id,
                loan_id: Some(loan.id),
                reason: FineReason::LateReturn,
                description: Some(format!(
                    "Material returned after due date {}",
                    loan.due_date.format("%Y-%m-%d")
                )),
                is_active: true,
            })
            .await?;
        self.apply_fine_policy(created.user_id).await?;
        Ok(Some(created))
    }

    /// Deactivating a fine leaves the fine count and any block untouched;
    /// the count is a historical record, not a live tally
    pub async fn update(&self, id: i32, update: &UpdateFine) -> AppResult<Fine> {
        self.repository.fines.update(id, update).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.fines.delete(id).await
    }

    async fn apply_fine_policy(&self, user_id: i32) -> AppResult<()> {
        let fine_count = self.repository.users.increment_fine_count(user_id).await?;
        let settings = self.settings.get().await?;

        if fine_count >= settings.max_fines_limit {
            let until = block_until(Utc::now(), settings.block_duration_days);
            self.repository.users.set_blocked_until(user_id, until).await?;
            tracing::info!(user_id, fine_count, until = %until, "user blocked after reaching fine limit");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_expiry_adds_configured_days() {
        let now = Utc::now();
        assert_eq!(block_until(now, 7), now + Duration::days(7));
        assert_eq!(block_until(now, 1), now + Duration::days(1));
    }
}
