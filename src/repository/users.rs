//! Users repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserQuery},
    repository::{fk_violation, unique_violation},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (authentication lookup)
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id != COALESCE($2, -1))",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Check if registration number already exists
    pub async fn registration_number_exists(
        &self,
        registration_number: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE registration_number = $1 AND id != COALESCE($2, -1))",
        )
        .bind(registration_number)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &UserQuery) {
        let mut sep = " WHERE ";
        if let Some(user_type) = query.user_type {
            qb.push(sep).push("user_type = ").push_bind(user_type);
            sep = " AND ";
        }
        if let Some(active) = query.active {
            qb.push(sep).push("active = ").push_bind(active);
            sep = " AND ";
        }
        if query.blocked == Some(true) {
            qb.push(sep).push("blocked_until > NOW()");
            sep = " AND ";
        }
        if let Some(ref search) = query.search {
            let pattern = format!("%{}%", search);
            qb.push(sep)
                .push("(name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR registration_number ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    /// Search users with filters and pagination
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        let params = query.list_params();

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM users");
        Self::push_filters(&mut count_qb, query);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new("SELECT * FROM users");
        Self::push_filters(&mut qb, query);
        qb.push(format!(" ORDER BY {}", params.order_by()));
        qb.push(" LIMIT ")
            .push_bind(params.limit)
            .push(" OFFSET ")
            .push_bind(params.offset());
        let users = qb.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok((users, total))
    }

    /// Create a new user with an already-hashed password
    pub async fn create(&self, user: &CreateUser, password_hash: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, registration_number, user_type, lab_link, password)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.registration_number)
        .bind(user.user_type)
        .bind(&user.lab_link)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "Email or registration number already registered"))
    }

    /// Update an existing user
    pub async fn update(&self, id: i32, update: &UpdateUser) -> AppResult<User> {
        let mut qb = QueryBuilder::new("UPDATE users SET updated_at = NOW()");
        if let Some(ref name) = update.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(ref email) = update.email {
            qb.push(", email = ").push_bind(email);
        }
        if let Some(ref registration_number) = update.registration_number {
            qb.push(", registration_number = ").push_bind(registration_number);
        }
        if let Some(user_type) = update.user_type {
            qb.push(", user_type = ").push_bind(user_type);
        }
        if let Some(ref lab_link) = update.lab_link {
            qb.push(", lab_link = ").push_bind(lab_link);
        }
        if let Some(active) = update.active {
            qb.push(", active = ").push_bind(active);
        }
        if let Some(blocked_until) = update.blocked_until {
            qb.push(", blocked_until = ").push_bind(blocked_until);
        }
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unique_violation(e, "Email or registration number already registered"))?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Delete a user
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let deleted: Option<i32> = sqlx::query_scalar("DELETE FROM users WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| fk_violation(e, "User has loans, fines or reservations"))?;
        deleted
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Atomically increment the fine count, returning the updated value
    pub async fn increment_fine_count(&self, id: i32) -> AppResult<i32> {
        sqlx::query_scalar(
            "UPDATE users SET fine_count = fine_count + 1, updated_at = NOW() WHERE id = $1 RETURNING fine_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Set the block expiry; nothing in the system clears it automatically
    pub async fn set_blocked_until(&self, id: i32, until: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE users SET blocked_until = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
