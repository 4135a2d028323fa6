//! Materials repository for database operations

use sqlx::{Pool, Postgres, QueryBuilder};

use crate::{
    error::{AppError, AppResult},
    models::material::{CreateMaterial, Material, MaterialQuery, UpdateMaterial},
    repository::{fk_violation, unique_violation},
};

#[derive(Clone)]
pub struct MaterialsRepository {
    pool: Pool<Postgres>,
}

impl MaterialsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get material by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Material> {
        sqlx::query_as::<_, Material>("SELECT * FROM materials WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Material with id {} not found", id)))
    }

    /// Check if internal code already exists
    pub async fn internal_code_exists(&self, internal_code: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM materials WHERE internal_code = $1)")
                .bind(internal_code)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Whether any active loan still references the material
    pub async fn has_active_loans(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM loans WHERE material_id = $1 AND status = 'active')",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &MaterialQuery) {
        let mut sep = " WHERE ";
        if let Some(material_type) = query.material_type {
            qb.push(sep).push("material_type = ").push_bind(material_type);
            sep = " AND ";
        }
        if let Some(condition_status) = query.condition_status {
            qb.push(sep)
                .push("condition_status = ")
                .push_bind(condition_status);
            sep = " AND ";
        }
        if let Some(ref thematic_area) = query.thematic_area {
            qb.push(sep)
                .push("thematic_area ILIKE ")
                .push_bind(format!("%{}%", thematic_area));
            sep = " AND ";
        }
        if query.available_only == Some(true) {
            qb.push(sep).push("quantity_available > 0");
            sep = " AND ";
        }
        if let Some(ref search) = query.search {
            let pattern = format!("%{}%", search);
            qb.push(sep)
                .push("(title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR internal_code ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR thematic_area ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    /// Search materials with filters and pagination
    pub async fn search(&self, query: &MaterialQuery) -> AppResult<(Vec<Material>, i64)> {
        let params = query.list_params();

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM materials");
        Self::push_filters(&mut count_qb, query);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::new("SELECT * FROM materials");
        Self::push_filters(&mut qb, query);
        qb.push(format!(" ORDER BY {}", params.order_by()));
        qb.push(" LIMIT ")
            .push_bind(params.limit)
            .push(" OFFSET ")
            .push_bind(params.offset());
        let materials = qb.build_query_as::<Material>().fetch_all(&self.pool).await?;

        Ok((materials, total))
    }

    /// Create a new material
    pub async fn create(&self, material: &CreateMaterial) -> AppResult<Material> {
        sqlx::query_as::<_, Material>(
            r#"
            INSERT INTO materials
                (internal_code, title, thematic_area, material_type,
                 quantity_total, quantity_available, condition_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&material.internal_code)
        .bind(&material.title)
        .bind(&material.thematic_area)
        .bind(material.material_type)
        .bind(material.quantity_total)
        .bind(material.quantity_available)
        .bind(material.condition_status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| unique_violation(e, "Internal code already registered"))
    }

    /// Update an existing material
    pub async fn update(&self, id: i32, update: &UpdateMaterial) -> AppResult<Material> {
        let mut qb = QueryBuilder::new("UPDATE materials SET updated_at = NOW()");
        if let Some(ref title) = update.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(ref thematic_area) = update.thematic_area {
            qb.push(", thematic_area = ").push_bind(thematic_area);
        }
        if let Some(material_type) = update.material_type {
            qb.push(", material_type = ").push_bind(material_type);
        }
        if let Some(quantity_total) = update.quantity_total {
            qb.push(", quantity_total = ").push_bind(quantity_total);
        }
        if let Some(quantity_available) = update.quantity_available {
            qb.push(", quantity_available = ").push_bind(quantity_available);
        }
        if let Some(condition_status) = update.condition_status {
            qb.push(", condition_status = ").push_bind(condition_status);
        }
        qb.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        qb.build_query_as::<Material>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Material with id {} not found", id)))
    }

    /// Delete a material
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let deleted: Option<i32> =
            sqlx::query_scalar("DELETE FROM materials WHERE id = $1 RETURNING id")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| fk_violation(e, "Material has loans or reservations"))?;
        deleted
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Material with id {} not found", id)))
    }

    /// Atomically take one unit of availability. Fails with InvalidState when
    /// no unit is left, so concurrent checkouts can never go below zero.
    pub async fn decrement_available(&self, id: i32) -> AppResult<()> {
        let rows = sqlx::query(
            r#"
            UPDATE materials
            SET quantity_available = quantity_available - 1, updated_at = NOW()
            WHERE id = $1 AND quantity_available > 0
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows == 0 {
            return Err(AppError::InvalidState("Material not available".to_string()));
        }
        Ok(())
    }

    /// Atomically give one unit of availability back, capped at the total
    pub async fn increment_available(&self, id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE materials
            SET quantity_available = LEAST(quantity_available + 1, quantity_total),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
