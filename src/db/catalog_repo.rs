// src/db/catalog_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::catalog::{Facility, Pitch},
};

// Facilities and pitches are owned by the catalog service; here they are read-only.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_facility<'e, E>(
        &self,
        executor: E,
        facility_id: i64,
    ) -> Result<Option<Facility>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let facility = sqlx::query_as::<_, Facility>("SELECT * FROM facilities WHERE id = $1")
            .bind(facility_id)
            .fetch_optional(executor)
            .await?;
        Ok(facility)
    }

    pub async fn find_pitch<'e, E>(
        &self,
        executor: E,
        pitch_id: i64,
    ) -> Result<Option<Pitch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pitch = sqlx::query_as::<_, Pitch>("SELECT * FROM pitches WHERE id = $1")
            .bind(pitch_id)
            .fetch_optional(executor)
            .await?;
        Ok(pitch)
    }

    /// Pitch together with the facility it belongs to.
    pub async fn find_pitch_with_facility(
        &self,
        pitch_id: i64,
    ) -> Result<Option<(Pitch, Facility)>, AppError> {
        let Some(pitch) = self.find_pitch(&self.pool, pitch_id).await? else {
            return Ok(None);
        };
        let facility = self.find_facility(&self.pool, pitch.facility_id).await?;
        Ok(facility.map(|f| (pitch, f)))
    }
}
