//! Loans repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, FromRow, Pool, Postgres, QueryBuilder, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{Loan, LoanDetails, LoanQuery},
        material::MaterialShort,
        user::UserShort,
    },
    repository::unique_violation,
};

/// Join projection shared by detail and list queries
const DETAILS_SELECT: &str = r#"
SELECT l.*,
       u.name AS user_name, u.email AS user_email,
       u.registration_number AS user_registration_number,
       m.internal_code AS material_internal_code, m.title AS material_title,
       m.material_type,
       s.name AS staff_name, s.email AS staff_email,
       s.registration_number AS staff_registration_number
FROM loans l
JOIN users u ON u.id = l.user_id
JOIN materials m ON m.id = l.material_id
JOIN users s ON s.id = l.responsible_staff_id
"#;

fn details_from_row(row: &PgRow) -> Result<LoanDetails, sqlx::Error> {
    Ok(LoanDetails {
        loan: Loan::from_row(row)?,
        user: UserShort {
            id: row.try_get("user_id")?,
            name: row.try_get("user_name")?,
            email: row.try_get("user_email")?,
            registration_number: row.try_get("user_registration_number")?,
        },
        material: MaterialShort {
            id: row.try_get("material_id")?,
            internal_code: row.try_get("material_internal_code")?,
            title: row.try_get("material_title")?,
            material_type: row.try_get("material_type")?,
        },
        responsible_staff: UserShort {
            id: row.try_get("responsible_staff_id")?,
            name: row.try_get("staff_name")?,
            email: row.try_get("staff_email")?,
            registration_number: row.try_get("staff_registration_number")?,
        },
    })
}

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID (flat record)
    pub async fn get_by_id(&self, id: i32) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get loan by ID with user/material/staff projections
    pub async fn get_details(&self, id: i32) -> AppResult<LoanDetails> {
        let row = sqlx::query(&format!("{} WHERE l.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;
        Ok(details_from_row(&row)?)
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &LoanQuery) {
        let mut sep = " WHERE ";
        if let Some(user_id) = query.user_id {
            qb.push(sep).push("l.user_id = ").push_bind(user_id);
            sep = " AND ";
        }
        if let Some(material_id) = query.material_id {
            qb.push(sep).push("l.material_id = ").push_bind(material_id);
            sep = " AND ";
        }
        if query.overdue == Some(true) {
            // Forces the "late but not yet swept" view regardless of status filter
            qb.push(sep).push("l.status = 'active' AND l.due_date < NOW()");
            return;
        }
        if let Some(status) = query.status {
            qb.push(sep).push("l.status = ").push_bind(status);
        }
    }

    /// Search loans with filters and pagination
    pub async fn search(&self, query: &LoanQuery) -> AppResult<(Vec<LoanDetails>, i64)> {
        let params = query.list_params();

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM loans l");
        Self::push_filters(&mut count_qb, query);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new(DETAILS_SELECT);
        Self::push_filters(&mut qb, query);
        qb.push(format!(" ORDER BY {}", params.order_by()));
        qb.push(" LIMIT ")
            .push_bind(params.limit)
            .push(" OFFSET ")
            .push_bind(params.offset());

        let rows = qb.build().fetch_all(&self.pool).await?;
        let loans = rows
            .iter()
            .map(details_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((loans, total))
    }

    /// Find the active loan for a (user, material) pair, if any
    pub async fn find_active_by_user_and_material(
        &self,
        user_id: i32,
        material_id: i32,
    ) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE user_id = $1 AND material_id = $2 AND status = 'active'",
        )
        .bind(user_id)
        .bind(material_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(loan)
    }

    /// Create a new active loan
    pub async fn create(
        &self,
        user_id: i32,
        material_id: i32,
        responsible_staff_id: i32,
        loan_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (user_id, material_id, responsible_staff_id, loan_date, due_date, status)
            VALUES ($1, $2, $3, $4, $5, 'active')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(material_id)
        .bind(responsible_staff_id)
        .bind(loan_date)
        .bind(due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "User already has this material on loan"))
    }

    /// Close a loan as returned. Guarded on status so concurrent returns of
    /// the same loan cannot both credit availability back.
    pub async fn mark_returned(
        &self,
        id: i32,
        return_date: DateTime<Utc>,
        return_condition: Option<&str>,
    ) -> AppResult<()> {
        let rows = sqlx::query(
            r#"
            UPDATE loans
            SET status = 'returned', return_date = $2, return_condition = $3, updated_at = NOW()
            WHERE id = $1 AND status <> 'returned'
            "#,
        )
        .bind(id)
        .bind(return_date)
        .bind(return_condition)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(AppError::InvalidState(
                "Loan has already been returned".to_string(),
            ));
        }
        Ok(())
    }

    /// Reclassify an expired active loan as overdue
    pub async fn mark_overdue(&self, id: i32) -> AppResult<()> {
        sqlx::query("UPDATE loans SET status = 'overdue', updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Active loans whose due date has passed
    pub async fn find_overdue(&self) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>(
            "SELECT * FROM loans WHERE status = 'active' AND due_date < NOW() ORDER BY due_date",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }
}
