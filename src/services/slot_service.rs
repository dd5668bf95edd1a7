// src/services/slot_service.rs

use std::collections::BTreeMap;

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::SlotRepository,
    models::catalog::{FacilitySlot, SlotInput, SlotView, MINUTES_PER_DAY},
    services::{
        audit::{AuditEvent, AuditLog},
        catalog_service::CatalogService,
    },
};

pub const DEFAULT_SLOT_MINUTES: i32 = 60;

// =============================================================================
//  Pure helpers
// =============================================================================

/// The hourly grid a facility gets until its owner stores any slot.
pub fn virtual_default_slots() -> Vec<SlotView> {
    (0..MINUTES_PER_DAY)
        .step_by(DEFAULT_SLOT_MINUTES as usize)
        .map(|start| SlotView::new(None, start, DEFAULT_SLOT_MINUTES, true))
        .collect()
}

pub fn is_well_formed(start_minute: i32, duration_minutes: i32) -> bool {
    (0..MINUTES_PER_DAY).contains(&start_minute)
        && duration_minutes > 0
        && duration_minutes <= MINUTES_PER_DAY
}

/// Owner view of stored rows, falling back to the virtual grid when there are none.
pub fn owner_view(rows: &[FacilitySlot]) -> Vec<SlotView> {
    if rows.is_empty() {
        virtual_default_slots()
    } else {
        rows.iter().map(SlotView::from).collect()
    }
}

/// Bookable slots. A facility whose rows are all inactive has none.
pub fn active_view(rows: &[FacilitySlot]) -> Vec<SlotView> {
    owner_view(rows).into_iter().filter(|s| s.active).collect()
}

/// Malformed entries dropped, duplicates collapsed (last one wins), ordered by key.
pub fn normalize_desired(desired: &[SlotInput]) -> BTreeMap<(i32, i32), bool> {
    desired
        .iter()
        .filter(|d| is_well_formed(d.start_minute, d.duration_minutes))
        .map(|d| ((d.start_minute, d.duration_minutes), d.active))
        .collect()
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SlotPlan {
    /// `(start, duration, active)` rows to write.
    pub upserts: Vec<(i32, i32, bool)>,
    /// Stored rows that left the desired set.
    pub deactivate: Vec<i64>,
}

pub fn plan_reconciliation(existing: &[FacilitySlot], desired: &[SlotInput]) -> SlotPlan {
    let desired = normalize_desired(desired);
    let stored: BTreeMap<(i32, i32), &FacilitySlot> = existing
        .iter()
        .map(|s| ((s.start_minute, s.duration_minutes), s))
        .collect();

    let upserts = desired
        .iter()
        .filter(|(key, active)| stored.get(*key).is_none_or(|row| row.active != **active))
        .map(|(&(start, duration), &active)| (start, duration, active))
        .collect();

    let deactivate = existing
        .iter()
        .filter(|s| s.active && !desired.contains_key(&(s.start_minute, s.duration_minutes)))
        .map(|s| s.id)
        .collect();

    SlotPlan { upserts, deactivate }
}

// =============================================================================
//  Service
// =============================================================================

#[derive(Clone)]
pub struct SlotService {
    catalog: CatalogService,
    repo: SlotRepository,
    audit: AuditLog,
    pool: PgPool,
}

impl SlotService {
    pub fn new(catalog: CatalogService, repo: SlotRepository, audit: AuditLog, pool: PgPool) -> Self {
        Self { catalog, repo, audit, pool }
    }

    pub async fn list_active_slots(&self, facility_id: i64) -> Result<Vec<SlotView>, AppError> {
        self.catalog.facility(facility_id).await?;
        self.bookable_slots(facility_id).await
    }

    /// Active grid without the facility lookup, for callers that already resolved it.
    pub async fn bookable_slots(&self, facility_id: i64) -> Result<Vec<SlotView>, AppError> {
        let rows = self.repo.list_stored(facility_id).await?;
        Ok(active_view(&rows))
    }

    pub async fn list_all_slots(&self, owner_id: i64, facility_id: i64) -> Result<Vec<SlotView>, AppError> {
        self.catalog.owned_facility(owner_id, facility_id).await?;
        let rows = self.repo.list_stored(facility_id).await?;
        Ok(owner_view(&rows))
    }

    pub async fn replace_slots(
        &self,
        owner_id: i64,
        facility_id: i64,
        desired: &[SlotInput],
    ) -> Result<Vec<SlotView>, AppError> {
        self.catalog.owned_facility(owner_id, facility_id).await?;

        let mut tx = self.pool.begin().await?;

        // 1. Current rows
        let existing = self.repo.list_for_facility(&mut *tx, facility_id).await?;

        // 2. Diff against the desired set
        let plan = plan_reconciliation(&existing, desired);

        // 3. Apply
        for (start, duration, active) in &plan.upserts {
            self.repo.upsert(&mut *tx, facility_id, *start, *duration, *active).await?;
        }
        self.repo.deactivate(&mut *tx, &plan.deactivate).await?;

        tx.commit().await?;

        tracing::info!(
            "Facility {} slots replaced: {} written, {} deactivated",
            facility_id,
            plan.upserts.len(),
            plan.deactivate.len()
        );
        self.audit.emit(AuditEvent::new(
            owner_id,
            "SLOTS_REPLACE",
            "Facility",
            facility_id,
            format!("upserts={} deactivated={}", plan.upserts.len(), plan.deactivate.len()),
        ));

        let rows = self.repo.list_stored(facility_id).await?;
        Ok(owner_view(&rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, start: i32, duration: i32, active: bool) -> FacilitySlot {
        FacilitySlot { id, facility_id: 1, start_minute: start, duration_minutes: duration, active }
    }

    fn input(start: i32, duration: i32, active: bool) -> SlotInput {
        SlotInput { start_minute: start, duration_minutes: duration, active }
    }

    #[test]
    fn virtual_grid_is_24_hourly_slots() {
        let slots = virtual_default_slots();
        assert_eq!(slots.len(), 24);
        assert_eq!(slots[0].label, "00:00-01:00");
        assert_eq!(slots[23].start_minute, 1380);
        assert!(slots.iter().all(|s| s.active && s.id.is_none() && s.duration_minutes == 60));
    }

    #[test]
    fn all_inactive_rows_mean_nothing_bookable() {
        let rows = vec![row(1, 600, 60, false)];
        assert!(active_view(&rows).is_empty());
        assert_eq!(owner_view(&rows).len(), 1);
    }

    #[test]
    fn normalize_drops_malformed_and_keeps_last_duplicate() {
        let desired = vec![
            input(-1, 60, true),
            input(1440, 60, true),
            input(600, 0, true),
            input(600, 1441, true),
            input(660, 60, true),
            input(660, 60, false),
        ];
        let normalized = normalize_desired(&desired);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized.get(&(660, 60)), Some(&false));
    }

    #[test]
    fn removed_slot_is_deactivated_not_deleted() {
        let existing = vec![row(1, 600, 60, true), row(2, 660, 60, true)];
        let plan = plan_reconciliation(&existing, &[input(660, 60, true), input(720, 60, true)]);
        assert_eq!(plan.deactivate, vec![1]);
        // 660 is unchanged, only 720 is written
        assert_eq!(plan.upserts, vec![(720, 60, true)]);
    }

    #[test]
    fn reactivating_a_stored_row_is_an_upsert() {
        let existing = vec![row(1, 600, 60, false)];
        let plan = plan_reconciliation(&existing, &[input(600, 60, true)]);
        assert_eq!(plan.upserts, vec![(600, 60, true)]);
        assert!(plan.deactivate.is_empty());
    }

    #[test]
    fn already_inactive_rows_are_left_alone() {
        let existing = vec![row(1, 600, 60, false)];
        let plan = plan_reconciliation(&existing, &[]);
        assert_eq!(plan, SlotPlan::default());
    }
}
