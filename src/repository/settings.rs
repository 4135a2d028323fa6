//! Settings repository (singleton row, lazily created)

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::setting::{Setting, UpdateSetting},
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: Pool<Postgres>,
}

impl SettingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get the settings row, creating it with defaults (3 fines, 7 days)
    /// when none exists yet
    pub async fn get_or_create(&self) -> AppResult<Setting> {
        let existing =
            sqlx::query_as::<_, Setting>("SELECT * FROM settings ORDER BY id LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        if let Some(setting) = existing {
            return Ok(setting);
        }

        let created =
            sqlx::query_as::<_, Setting>("INSERT INTO settings DEFAULT VALUES RETURNING *")
                .fetch_one(&self.pool)
                .await?;
        Ok(created)
    }

    /// Update the settings row
    pub async fn update(&self, update: &UpdateSetting) -> AppResult<Setting> {
        let existing = self.get_or_create().await?;

        let setting = sqlx::query_as::<_, Setting>(
            r#"
            UPDATE settings
            SET max_fines_limit = COALESCE($2, max_fines_limit),
                block_duration_days = COALESCE($3, block_duration_days),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(existing.id)
        .bind(update.max_fines_limit)
        .bind(update.block_duration_days)
        .fetch_one(&self.pool)
        .await?;

        Ok(setting)
    }
}
