//! Audit logs repository — append and list only, never mutated

use sqlx::{postgres::PgRow, FromRow, Pool, Postgres, QueryBuilder, Row};

use crate::{
    error::AppResult,
    models::{
        audit_log::{AuditLog, AuditLogDetails, AuditLogQuery},
        user::UserShort,
    },
};

const DETAILS_SELECT: &str = r#"
SELECT a.*,
       u.name AS user_name, u.email AS user_email,
       u.registration_number AS user_registration_number
FROM audit_logs a
LEFT JOIN users u ON u.id = a.user_id
"#;

fn details_from_row(row: &PgRow) -> Result<AuditLogDetails, sqlx::Error> {
    let user = match row.try_get::<Option<i32>, _>("user_id")? {
        Some(id) => row
            .try_get::<Option<String>, _>("user_name")?
            .map(|name| -> Result<UserShort, sqlx::Error> {
                Ok(UserShort {
                    id,
                    name,
                    email: row.try_get("user_email")?,
                    registration_number: row.try_get("user_registration_number")?,
                })
            })
            .transpose()?,
        None => None,
    };

    Ok(AuditLogDetails {
        log: AuditLog::from_row(row)?,
        user,
    })
}

#[derive(Clone)]
pub struct AuditLogsRepository {
    pool: Pool<Postgres>,
}

impl AuditLogsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append an activity record
    pub async fn insert(
        &self,
        user_id: Option<i32>,
        entity: &str,
        action_type: &str,
        details: &serde_json::Value,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO audit_logs (user_id, entity, action_type, details) VALUES ($1, $2, $3, $4)",
        )
        .bind(user_id)
        .bind(entity)
        .bind(action_type)
        .bind(details)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    fn push_filters<'a>(qb: &mut QueryBuilder<'a, Postgres>, query: &'a AuditLogQuery) {
        let mut sep = " WHERE ";
        if let Some(user_id) = query.user_id {
            qb.push(sep).push("a.user_id = ").push_bind(user_id);
            sep = " AND ";
        }
        if let Some(ref entity) = query.entity {
            qb.push(sep).push("a.entity = ").push_bind(entity);
            sep = " AND ";
        }
        if let Some(ref action_type) = query.action_type {
            qb.push(sep).push("a.action_type = ").push_bind(action_type);
        }
    }

    /// Search audit logs with filters and pagination
    pub async fn search(&self, query: &AuditLogQuery) -> AppResult<(Vec<AuditLogDetails>, i64)> {
        let params = query.list_params();

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM audit_logs a");
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
        let logs = rows
            .iter()
            .map(details_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((logs, total))
    }
}
