// src/db/slot_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{common::error::AppError, models::catalog::FacilitySlot};

#[derive(Clone)]
pub struct SlotRepository {
    pool: PgPool,
}

impl SlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every stored row of the facility, active or not, by start time.
    pub async fn list_for_facility<'e, E>(
        &self,
        executor: E,
        facility_id: i64,
    ) -> Result<Vec<FacilitySlot>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slots = sqlx::query_as::<_, FacilitySlot>(
            r#"
            SELECT id, facility_id, start_minute, duration_minutes, active
            FROM facility_slots
            WHERE facility_id = $1
            ORDER BY start_minute ASC, duration_minutes ASC
            "#,
        )
        .bind(facility_id)
        .fetch_all(executor)
        .await?;
        Ok(slots)
    }

    pub async fn list_stored(&self, facility_id: i64) -> Result<Vec<FacilitySlot>, AppError> {
        self.list_for_facility(&self.pool, facility_id).await
    }

    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        facility_id: i64,
        start_minute: i32,
        duration_minutes: i32,
        active: bool,
    ) -> Result<FacilitySlot, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slot = sqlx::query_as::<_, FacilitySlot>(
            r#"
            INSERT INTO facility_slots (facility_id, start_minute, duration_minutes, active)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (facility_id, start_minute, duration_minutes)
            DO UPDATE SET active = EXCLUDED.active
            RETURNING id, facility_id, start_minute, duration_minutes, active
            "#,
        )
        .bind(facility_id)
        .bind(start_minute)
        .bind(duration_minutes)
        .bind(active)
        .fetch_one(executor)
        .await?;
        Ok(slot)
    }

    // Soft delete only; rows are never removed.
    pub async fn deactivate<'e, E>(&self, executor: E, slot_ids: &[i64]) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if slot_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE facility_slots SET active = FALSE WHERE id = ANY($1) AND active",
        )
        .bind(slot_ids)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
