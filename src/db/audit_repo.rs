// src/db/audit_repo.rs

use sqlx::PgPool;

use crate::common::error::AppError;

#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        actor_user_id: i64,
        action: &str,
        entity_type: &str,
        entity_id: Option<i64>,
        detail: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (actor_user_id, action, entity_type, entity_id, detail)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(actor_user_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(detail)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
