//! Reservations repository for database operations

use sqlx::{postgres::PgRow, FromRow, Pool, Postgres, QueryBuilder, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        material::MaterialShort,
        reservation::{Reservation, ReservationDetails, ReservationQuery},
        user::UserShort,
    },
    repository::unique_violation,
};

const DETAILS_SELECT: &str = r#"
SELECT r.*,
       u.name AS user_name, u.email AS user_email,
       u.registration_number AS user_registration_number,
       m.internal_code AS material_internal_code, m.title AS material_title,
       m.material_type
FROM reservations r
JOIN users u ON u.id = r.user_id
JOIN materials m ON m.id = r.material_id
"#;

fn details_from_row(row: &PgRow) -> Result<ReservationDetails, sqlx::Error> {
    Ok(ReservationDetails {
        reservation: Reservation::from_row(row)?,
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
    })
}

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reservation by ID with user/material projections
    pub async fn get_details(&self, id: i32) -> AppResult<ReservationDetails> {
        let row = sqlx::query(&format!("{} WHERE r.id = $1", DETAILS_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))?;
        Ok(details_from_row(&row)?)
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ReservationQuery) {
        let mut sep = " WHERE ";
        if let Some(user_id) = query.user_id {
            qb.push(sep).push("r.user_id = ").push_bind(user_id);
            sep = " AND ";
        }
        if let Some(material_id) = query.material_id {
            qb.push(sep).push("r.material_id = ").push_bind(material_id);
        }
    }

    /// Search reservations with filters and pagination
    pub async fn search(
        &self,
        query: &ReservationQuery,
    ) -> AppResult<(Vec<ReservationDetails>, i64)> {
        let params = query.list_params();

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM reservations r");
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
        let reservations = rows
            .iter()
            .map(details_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((reservations, total))
    }

    /// Find an existing reservation for a (material, user) pair
    pub async fn find_by_material_and_user(
        &self,
        material_id: i32,
        user_id: i32,
    ) -> AppResult<Option<Reservation>> {
        let reservation = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE material_id = $1 AND user_id = $2",
        )
        .bind(material_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(reservation)
    }

    /// Head of the queue for a material: highest priority first,
    /// earliest created within the same priority
    pub async fn find_next_in_queue(&self, material_id: i32) -> AppResult<Option<Reservation>> {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE material_id = $1
            ORDER BY priority_level DESC, created_at ASC
            LIMIT 1
            "#,
        )
        .bind(material_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(reservation)
    }

    /// Create a new reservation
    pub async fn create(
        &self,
        material_id: i32,
        user_id: i32,
        priority_level: i32,
    ) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (material_id, user_id, priority_level)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(material_id)
        .bind(user_id)
        .bind(priority_level)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "User already has a reservation for this material"))
    }

    /// Delete a reservation by ID
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let deleted: Option<i32> =
            sqlx::query_scalar("DELETE FROM reservations WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    /// Delete any reservation the user holds for the material
    pub async fn delete_by_material_and_user(
        &self,
        material_id: i32,
        user_id: i32,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM reservations WHERE material_id = $1 AND user_id = $2")
            .bind(material_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
