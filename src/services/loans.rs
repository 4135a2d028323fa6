//! Loans service: checkout, return and the overdue sweep

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, Loan, LoanDetails, LoanQuery, LoanStatus, ReturnLoan},
    repository::Repository,
    services::{fines::FinesService, reservations::ReservationsService},
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    fines: FinesService,
    reservations: ReservationsService,
}

impl LoansService {
    pub fn new(
        repository: Repository,
        fines: FinesService,
        reservations: ReservationsService,
    ) -> Self {
        Self {
            repository,
            fines,
            reservations,
        }
    }

    pub async fn get(&self, id: i32) -> AppResult<LoanDetails> {
        self.repository.loans.get_details(id).await
    }

    pub async fn list(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        self.repository.loans.search(query).await
    }

    /// Check a material out to a user. The responsible staff member is the
    /// authenticated caller.
    pub async fn create(&self, staff_id: i32, request: &CreateLoan) -> AppResult<LoanDetails> {
        let now = Utc::now();
        let user = self.repository.users.get_by_id(request.user_id).await?;
        if !user.active {
            return Err(AppError::InvalidState("User is inactive".to_string()));
        }
        if user.is_blocked(now) {
            let until = user.blocked_until.unwrap_or(now);
            return Err(AppError::InvalidState(format!(
                "User is blocked until {}",
                until.format("%Y-%m-%d")
            )));
        }

        let material = self.repository.materials.get_by_id(request.material_id).await?;

        if self
            .repository
            .loans
            .find_active_by_user_and_material(user.id, material.id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "User already has this material on loan".to_string(),
            ));
        }

        // Atomic take; fails when the last unit went to a concurrent checkout
        self.repository.materials.decrement_available(material.id).await?;

        let loan = match self
            .repository
            .loans
            .create(user.id, material.id, staff_id, now, request.due_date)
            .await
        {
            Ok(loan) => loan,
            Err(e) => {
                // Give the reserved unit back before surfacing the error
                if let Err(inner) = self.repository.materials.increment_available(material.id).await
                {
                    tracing::error!(material_id = material.id, error = %inner, "failed to restore availability after loan creation error");
                }
                return Err(e);
            }
        };

        // The borrower got the item; any reservation they held is now moot.
        // Queue cleanup must never fail the checkout itself.
        if let Err(e) = self
            .repository
            .reservations
            .delete_by_material_and_user(material.id, user.id)
            .await
        {
            tracing::warn!(loan_id = loan.id, error = %e, "failed to remove borrower's reservation");
        }

        self.repository.loans.get_details(loan.id).await
    }

    /// Close a loan. Late returns raise a fine unless the sweep already did.
    pub async fn return_loan(&self, id: i32, request: &ReturnLoan) -> AppResult<LoanDetails> {
        let loan = self.repository.loans.get_by_id(id).await?;
        if loan.status == LoanStatus::Returned {
            return Err(AppError::InvalidState(
                "Loan has already been returned".to_string(),
            ));
        }

        let now = Utc::now();
        self.repository
            .loans
            .mark_returned(id, now, request.return_condition.as_deref())
            .await?;
        self.repository.materials.increment_available(loan.material_id).await?;

        if now > loan.due_date {
            self.fines.fine_late_return(&loan).await?;
        }

        self.reservations.on_material_available(loan.material_id).await;

        self.repository.loans.get_details(id).await
    }

    /// Reclassify expired active loans as overdue and fine the borrowers.
    /// Idempotent: a loan already carrying an active late-return fine is not
    /// fined again. Returns the loans as they were before the sweep.
    pub async fn sweep_overdue(&self) -> AppResult<Vec<Loan>> {
        let overdue = self.repository.loans.find_overdue().await?;

        for loan in &overdue {
            self.repository.loans.mark_overdue(loan.id).await?;
            self.fines.fine_late_return(loan).await?;
        }

        if !overdue.is_empty() {
            tracing::info!(count = overdue.len(), "marked overdue loans");
        }
        Ok(overdue)
    }
}
