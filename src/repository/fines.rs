//! Fines repository for database operations

use sqlx::{postgres::PgRow, FromRow, Pool, Postgres, QueryBuilder, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        fine::{CreateFine, Fine, FineDetails, FineQuery, UpdateFine},
        user::UserShort,
    },
};

const DETAILS_SELECT: &str = r#"
SELECT f.*,
       u.name AS user_name, u.email AS user_email,
       u.registration_number AS user_registration_number
FROM fines f
JOIN users u ON u.id = f.user_id
"#;

fn details_from_row(row: &PgRow) -> Result<FineDetails, sqlx::Error> {
    Ok(FineDetails {
        fine: Fine::from_row(row)?,
        user: UserShort {
            id: row.try_get("user_id")?,
            name: row.try_get("user_name")?,
            email: row.try_get("user_email")?,
            registration_number: row.try_get("user_registration_number")?,
        },
    })
}

#[derive(Clone)]
pub struct FinesRepository {
    pool: Pool<Postgres>,
}

impl FinesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get fine by ID (flat record)
    pub async fn get_by_id(&self, id: i32) -> AppResult<Fine> {
        sqlx::query_as::<_, Fine>("SELECT * FROM fines WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fine with id {} not found", id)))
    }

    /// Get fine by ID with user projection
    pub async fn get_details(&self, id: i32) -> AppResult<FineDetails> {
        let row = sqlx::query(&format!("{} WHERE f.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fine with id {} not found", id)))?;
        Ok(details_from_row(&row)?)
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &FineQuery) {
        let mut sep = " WHERE ";
        if let Some(user_id) = query.user_id {
            qb.push(sep).push("f.user_id = ").push_bind(user_id);
            sep = " AND ";
        }
        if let Some(loan_id) = query.loan_id {
            qb.push(sep).push("f.loan_id = ").push_bind(loan_id);
            sep = " AND ";
        }
        if let Some(is_active) = query.is_active {
            qb.push(sep).push("f.is_active = ").push_bind(is_active);
            sep = " AND ";
        }
        if let Some(reason) = query.reason {
            qb.push(sep).push("f.reason = ").push_bind(reason);
        }
    }

    /// Search fines with filters and pagination
    pub async fn search(&self, query: &FineQuery) -> AppResult<(Vec<FineDetails>, i64)> {
        let params = query.list_params();

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM fines f");
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
        let fines = rows
            .iter()
            .map(details_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((fines, total))
    }

    /// Active fines for a user
    pub async fn find_active_by_user(&self, user_id: i32) -> AppResult<Vec<Fine>> {
        let fines = sqlx::query_as::<_, Fine>(
            "SELECT * FROM fines WHERE user_id = $1 AND is_active ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(fines)
    }

    /// Whether an active late-return fine already references the loan.
    /// Keeps the overdue sweep idempotent.
    pub async fn active_late_return_exists(&self, loan_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM fines WHERE loan_id = $1 AND is_active AND reason = 'late_return')",
        )
        .bind(loan_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a new fine
    pub async fn create(&self, fine: &CreateFine) -> AppResult<Fine> {
        sqlx::query_as::<_, Fine>(
            r#"
            INSERT INTO fines (user_id, loan_id, reason, description, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(fine.user_id)
        .bind(fine.loan_id)
        .bind(fine.reason)
        .bind(&fine.description)
        .bind(fine.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    /// Update an existing fine
    pub async fn update(&self, id: i32, update: &UpdateFine) -> AppResult<Fine> {
        let mut qb = QueryBuilder::new("UPDATE fines SET updated_at = NOW()");
        if let Some(ref description) = update.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(is_active) = update.is_active {
            qb.push(", is_active = ").push_bind(is_active);
        }
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Fine>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Fine with id {} not found", id)))
    }

    /// Delete a fine
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let deleted: Option<i32> = sqlx::query_scalar("DELETE FROM fines WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Fine with id {} not found", id)))
    }
}
