// src/services/catalog_service.rs

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::catalog::{Facility, Pitch},
};

// Lookups and ownership checks shared by every other service.
#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    pool: sqlx::PgPool,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository, pool: sqlx::PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn facility(&self, facility_id: i64) -> Result<Facility, AppError> {
        self.repo
            .find_facility(&self.pool, facility_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Facility".into()))
    }

    pub async fn pitch(&self, pitch_id: i64) -> Result<(Pitch, Facility), AppError> {
        self.repo
            .find_pitch_with_facility(pitch_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Pitch".into()))
    }

    /// `NotFound` for an unknown facility, `Forbidden` for someone else's.
    pub async fn owned_facility(&self, owner_id: i64, facility_id: i64) -> Result<Facility, AppError> {
        let facility = self.facility(facility_id).await?;
        ensure_owner(&facility, owner_id)?;
        Ok(facility)
    }

    pub async fn owned_pitch(&self, owner_id: i64, pitch_id: i64) -> Result<(Pitch, Facility), AppError> {
        let (pitch, facility) = self.pitch(pitch_id).await?;
        ensure_owner(&facility, owner_id)?;
        Ok((pitch, facility))
    }
}

pub fn ensure_owner(facility: &Facility, owner_id: i64) -> Result<(), AppError> {
    if facility.owner_user_id == owner_id {
        Ok(())
    } else {
        tracing::debug!("User {} is not the owner of facility {}", owner_id, facility.id);
        Err(AppError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn facility(owner: i64) -> Facility {
        Facility {
            id: 1,
            owner_user_id: owner,
            name: "Arena".into(),
            name_key: "arena".into(),
            address: None,
            active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_passes_and_stranger_is_forbidden() {
        assert!(ensure_owner(&facility(5), 5).is_ok());
        assert!(matches!(ensure_owner(&facility(5), 6), Err(AppError::Forbidden)));
    }
}
