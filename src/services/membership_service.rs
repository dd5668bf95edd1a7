// src/services/membership_service.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, MembershipRepository},
    models::membership::{
        Membership, MembershipRequest, MembershipRequestStatus, MembershipStanding, MembershipStatus,
    },
    services::{
        audit::{AuditEvent, AuditLog},
        catalog_service::{ensure_owner, CatalogService},
    },
};

/// Booking gate: only an ACTIVE membership lets a member reserve.
pub fn require_active(membership: Option<Membership>) -> Result<Membership, AppError> {
    match membership {
        None => Err(AppError::NotMember),
        Some(m) if m.status != MembershipStatus::Active => Err(AppError::MembershipNotActive),
        Some(m) => Ok(m),
    }
}

#[derive(Clone)]
pub struct MembershipService {
    catalog: CatalogService,
    catalog_repo: CatalogRepository,
    repo: MembershipRepository,
    audit: AuditLog,
    pool: PgPool,
}

impl MembershipService {
    pub fn new(
        catalog: CatalogService,
        catalog_repo: CatalogRepository,
        repo: MembershipRepository,
        audit: AuditLog,
        pool: PgPool,
    ) -> Self {
        Self { catalog, catalog_repo, repo, audit, pool }
    }

    // =========================================================================
    //  MEMBER SIDE
    // =========================================================================

    pub async fn request_membership(
        &self,
        user_id: i64,
        facility_id: i64,
    ) -> Result<MembershipRequest, AppError> {
        // 1. Facility must exist
        self.catalog.facility(facility_id).await?;

        // 2. One request per (facility, user), whatever its state
        if self.repo.find_request(&self.pool, facility_id, user_id).await?.is_some() {
            return Err(AppError::DuplicateRequest);
        }

        // 3. Already in
        if let Some(m) = self.repo.find_membership(&self.pool, facility_id, user_id).await? {
            if m.status == MembershipStatus::Active {
                return Err(AppError::AlreadyMember);
            }
        }

        let request = self.repo.create_request(&self.pool, facility_id, user_id).await?;

        tracing::info!("User {} requested membership of facility {}", user_id, facility_id);
        self.audit.emit(AuditEvent::new(
            user_id,
            "MEMBERSHIP_REQUEST",
            "MembershipRequest",
            request.id,
            format!("facility={}", facility_id),
        ));

        Ok(request)
    }

    pub async fn status_for(&self, user_id: i64, facility_id: i64) -> Result<MembershipStanding, AppError> {
        self.catalog.facility(facility_id).await?;

        let membership = self.repo.find_membership(&self.pool, facility_id, user_id).await?;
        let request = self.repo.find_request(&self.pool, facility_id, user_id).await?;

        Ok(MembershipStanding {
            facility_id,
            membership_id: membership.as_ref().map(|m| m.id),
            membership_status: membership.map(|m| m.status),
            request_status: request.map(|r| r.status),
        })
    }

    /// The membership a booking is made under.
    pub async fn active_membership(&self, user_id: i64, facility_id: i64) -> Result<Membership, AppError> {
        let membership = self.repo.find_membership(&self.pool, facility_id, user_id).await?;
        require_active(membership)
    }

    pub async fn membership(&self, membership_id: i64) -> Result<Membership, AppError> {
        self.repo
            .find_membership_by_id(&self.pool, membership_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership".into()))
    }

    // =========================================================================
    //  OWNER SIDE
    // =========================================================================

    pub async fn approve(&self, owner_id: i64, request_id: i64) -> Result<Membership, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self.lock_open_request(&mut tx, owner_id, request_id).await?;

        let membership = self
            .repo
            .upsert_active(&mut *tx, request.facility_id, request.user_id)
            .await?;
        self.repo
            .decide_request(&mut *tx, request.id, MembershipRequestStatus::Approved, owner_id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Membership request {} approved, user {} is a member of facility {}",
            request.id,
            request.user_id,
            request.facility_id
        );
        self.audit.emit(AuditEvent::new(
            owner_id,
            "MEMBERSHIP_APPROVE",
            "MembershipRequest",
            request.id,
            format!("membership={}", membership.id),
        ));

        Ok(membership)
    }

    pub async fn reject(&self, owner_id: i64, request_id: i64) -> Result<MembershipRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self.lock_open_request(&mut tx, owner_id, request_id).await?;
        let decided = self
            .repo
            .decide_request(&mut *tx, request.id, MembershipRequestStatus::Rejected, owner_id)
            .await?;

        tx.commit().await?;

        tracing::info!("Membership request {} rejected", request.id);
        self.audit.emit(AuditEvent::new(owner_id, "MEMBERSHIP_REJECT", "MembershipRequest", request.id, ""));

        Ok(decided)
    }

    pub async fn list_pending_requests(&self, owner_id: i64) -> Result<Vec<MembershipRequest>, AppError> {
        self.repo.list_pending_for_owner(owner_id).await
    }

    /// Suspend, cancel or re-activate an existing membership.
    pub async fn set_membership_status(
        &self,
        owner_id: i64,
        membership_id: i64,
        status: MembershipStatus,
    ) -> Result<Membership, AppError> {
        let membership = self.membership(membership_id).await?;
        self.catalog.owned_facility(owner_id, membership.facility_id).await?;

        if membership.status == status {
            return Ok(membership);
        }

        let updated = self.repo.set_status(&self.pool, membership_id, status).await?;

        tracing::info!("Membership {} is now {:?}", membership_id, status);
        self.audit.emit(AuditEvent::new(
            owner_id,
            "MEMBERSHIP_STATUS",
            "Membership",
            membership_id,
            format!("{:?} -> {:?}", membership.status, status),
        ));

        Ok(updated)
    }

    // Locked for the rest of the transaction; `AlreadyDecided` once it left PENDING.
    async fn lock_open_request(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        owner_id: i64,
        request_id: i64,
    ) -> Result<MembershipRequest, AppError> {
        let request = self
            .repo
            .lock_request(&mut **tx, request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Membership request".into()))?;

        let facility = self
            .catalog_repo
            .find_facility(&mut **tx, request.facility_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Facility".into()))?;
        ensure_owner(&facility, owner_id)?;

        if request.status.is_terminal() {
            return Err(AppError::AlreadyDecided);
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn membership(status: MembershipStatus) -> Membership {
        Membership { id: 3, facility_id: 1, user_id: 9, status, started_at: Utc::now() }
    }

    #[test]
    fn no_membership_is_not_member() {
        assert!(matches!(require_active(None), Err(AppError::NotMember)));
    }

    #[test]
    fn suspended_or_cancelled_is_not_active() {
        for status in [MembershipStatus::Suspended, MembershipStatus::Cancelled] {
            assert!(matches!(
                require_active(Some(membership(status))),
                Err(AppError::MembershipNotActive)
            ));
        }
    }

    #[test]
    fn active_membership_passes_through() {
        let m = require_active(Some(membership(MembershipStatus::Active))).unwrap();
        assert_eq!(m.id, 3);
    }
}
