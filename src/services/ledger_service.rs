// src/services/ledger_service.rs

use std::collections::{BTreeSet, HashMap};

use chrono::{Duration, NaiveDate};

use crate::{
    common::{error::AppError, time::FacilityClock},
    db::{LedgerRepository, ReservationRepository},
    models::{
        catalog::{slot_label, SlotView, MINUTES_PER_DAY},
        ledger::{
            BusyInterval, LedgerPlayer, LedgerRow, NewReservationCount, Occupancy, OwnerReservationRow,
            SlotAvailability,
        },
        reservation::ReservationPlayer,
    },
    services::{
        audit::{AuditEvent, AuditLog},
        catalog_service::CatalogService,
        slot_service::{SlotService, DEFAULT_SLOT_MINUTES},
    },
};

// =============================================================================
//  Pure grid builders
// =============================================================================

/// Start offsets (minutes after local midnight of `date`) of every busy base slot.
///
/// Each reservation is cut into steps of the slot it started on, or of the
/// default hour when the grid no longer has that slot.
pub fn busy_offsets(
    clock: &FacilityClock,
    date: NaiveDate,
    slots: &[SlotView],
    intervals: &[BusyInterval],
) -> Vec<i32> {
    let (day_start, day_end) = clock.day_bounds(date);
    let mut busy = BTreeSet::new();

    for interval in intervals {
        let minute = clock.minute_of_day(interval.start_time);
        let step = slots
            .iter()
            .find(|s| s.start_minute == minute)
            .map(|s| s.duration_minutes)
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_SLOT_MINUTES);

        let mut cursor = interval.start_time;
        while cursor < interval.end_time && cursor < day_end {
            if cursor >= day_start {
                let offset = (cursor - day_start).num_minutes() as i32;
                if (0..MINUTES_PER_DAY).contains(&offset) {
                    busy.insert(offset);
                }
            }
            cursor += Duration::minutes(step as i64);
        }
    }

    busy.into_iter().collect()
}

/// Active slots of `date` flagged as occupied when any live reservation touches them.
pub fn slot_availability(
    clock: &FacilityClock,
    date: NaiveDate,
    slots: &[SlotView],
    intervals: &[BusyInterval],
) -> Vec<SlotAvailability> {
    slots
        .iter()
        .filter(|s| s.active)
        .map(|s| {
            let start = clock.at_minute(date, s.start_minute);
            let end = start + Duration::minutes(s.duration_minutes as i64);
            let occupied = intervals
                .iter()
                .any(|i| i.start_time < end && i.end_time > start);
            SlotAvailability {
                start_minute: s.start_minute,
                duration_minutes: s.duration_minutes,
                active: s.active,
                occupied,
                label: slot_label(s.start_minute, s.duration_minutes),
            }
        })
        .collect()
}

fn attach_players(rows: &mut [LedgerRow], players: Vec<LedgerPlayer>) {
    let mut by_reservation: HashMap<i64, Vec<LedgerPlayer>> = HashMap::new();
    for player in players {
        by_reservation.entry(player.reservation_id).or_default().push(player);
    }
    for row in rows.iter_mut() {
        row.players = by_reservation.remove(&row.id).unwrap_or_default();
    }
}

// =============================================================================
//  Service
// =============================================================================

#[derive(Clone)]
pub struct LedgerService {
    catalog: CatalogService,
    slots: SlotService,
    repo: LedgerRepository,
    reservations: ReservationRepository,
    audit: AuditLog,
    clock: FacilityClock,
    pool: sqlx::PgPool,
}

impl LedgerService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: CatalogService,
        slots: SlotService,
        repo: LedgerRepository,
        reservations: ReservationRepository,
        audit: AuditLog,
        clock: FacilityClock,
        pool: sqlx::PgPool,
    ) -> Self {
        Self { catalog, slots, repo, reservations, audit, clock, pool }
    }

    pub async fn day_ledger(
        &self,
        owner_id: i64,
        facility_id: i64,
        pitch_id: Option<i64>,
        date: NaiveDate,
    ) -> Result<Vec<LedgerRow>, AppError> {
        self.catalog.owned_facility(owner_id, facility_id).await?;

        if let Some(pitch_id) = pitch_id {
            let (pitch, _) = self.catalog.pitch(pitch_id).await?;
            if pitch.facility_id != facility_id {
                return Err(AppError::NotFound("Pitch".into()));
            }
        }

        let (from, to) = self.clock.day_bounds(date);
        let mut rows = self.repo.day_rows(facility_id, pitch_id, from, to).await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let players = self.repo.players_for(&ids).await?;
        attach_players(&mut rows, players);

        Ok(rows)
    }

    /// Live reservations of the day over every facility the owner has.
    ///
    /// Filters narrow the list; a facility or pitch the owner does not hold yields nothing.
    pub async fn list_for_owner(
        &self,
        owner_id: i64,
        date: NaiveDate,
        facility_id: Option<i64>,
        pitch_id: Option<i64>,
    ) -> Result<Vec<OwnerReservationRow>, AppError> {
        let (from, to) = self.clock.day_bounds(date);
        self.repo.owner_rows(owner_id, facility_id, pitch_id, from, to).await
    }

    pub async fn occupancy(&self, pitch_id: i64, date: NaiveDate) -> Result<Occupancy, AppError> {
        let (pitch, facility) = self.catalog.pitch(pitch_id).await?;
        let slots = self.slots.bookable_slots(facility.id).await?;

        let (from, to) = self.clock.day_bounds(date);
        let intervals = self.repo.busy_intervals(pitch.id, from, to).await?;

        Ok(Occupancy {
            pitch_id: pitch.id,
            date,
            busy_minutes: busy_offsets(&self.clock, date, &slots, &intervals),
        })
    }

    pub async fn availability(&self, pitch_id: i64, date: NaiveDate) -> Result<Vec<SlotAvailability>, AppError> {
        let (pitch, facility) = self.catalog.pitch(pitch_id).await?;
        let slots = self.slots.bookable_slots(facility.id).await?;

        // Slots late in the day may run past midnight
        let (from, to) = self.clock.day_bounds(date);
        let intervals = self
            .repo
            .busy_intervals(pitch.id, from, to + Duration::minutes(MINUTES_PER_DAY as i64))
            .await?;

        Ok(slot_availability(&self.clock, date, &slots, &intervals))
    }

    pub async fn new_reservation_count(
        &self,
        owner_id: i64,
        after_id: Option<i64>,
    ) -> Result<NewReservationCount, AppError> {
        let after_id = after_id.unwrap_or(0);
        let (max_id, new_count) = self.repo.owner_counter(owner_id, after_id).await?;
        Ok(NewReservationCount { after_id, max_id, new_count })
    }

    pub async fn set_player_paid(
        &self,
        owner_id: i64,
        reservation_id: i64,
        player_id: i64,
        paid: bool,
    ) -> Result<ReservationPlayer, AppError> {
        let reservation = self
            .reservations
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reservation".into()))?;
        self.catalog.owned_pitch(owner_id, reservation.pitch_id).await?;

        let player = self
            .reservations
            .find_player(player_id)
            .await?
            .filter(|p| p.reservation_id == reservation.id)
            .ok_or_else(|| AppError::NotFound("Player".into()))?;

        let updated = self.reservations.set_player_paid(&self.pool, player.id, paid).await?;

        self.audit.emit(AuditEvent::new(
            owner_id,
            "PLAYER_PAID",
            "ReservationPlayer",
            player.id,
            format!("reservation={} paid={}", reservation.id, paid),
        ));

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use proptest::prelude::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()
    }

    fn busy(start: &str, end: &str) -> BusyInterval {
        BusyInterval { start_time: utc(start), end_time: utc(end) }
    }

    fn hourly() -> Vec<SlotView> {
        crate::services::slot_service::virtual_default_slots()
    }

    #[test]
    fn two_hour_booking_covers_two_hourly_offsets() {
        let clock = FacilityClock::default();
        // 18:00-20:00 local
        let intervals = vec![busy("2026-01-04T15:00:00Z", "2026-01-04T17:00:00Z")];
        assert_eq!(busy_offsets(&clock, day(), &hourly(), &intervals), vec![1080, 1140]);
    }

    #[test]
    fn unmatched_start_falls_back_to_hourly_steps() {
        let clock = FacilityClock::default();
        let slots = vec![SlotView::new(Some(1), 600, 90, true)];
        // 18:00-20:00 local, no 18:00 slot in the grid any more
        let intervals = vec![busy("2026-01-04T15:00:00Z", "2026-01-04T17:00:00Z")];
        assert_eq!(busy_offsets(&clock, day(), &slots, &intervals), vec![1080, 1140]);
    }

    #[test]
    fn booking_crossing_midnight_is_clipped_to_the_day() {
        let clock = FacilityClock::default();
        // 23:00 on the 4th to 01:00 on the 5th local
        let intervals = vec![busy("2026-01-04T20:00:00Z", "2026-01-04T22:00:00Z")];
        assert_eq!(busy_offsets(&clock, day(), &hourly(), &intervals), vec![1380]);
    }

    #[test]
    fn availability_flags_only_touched_slots() {
        let clock = FacilityClock::default();
        let intervals = vec![busy("2026-01-04T15:00:00Z", "2026-01-04T17:00:00Z")];
        let grid = slot_availability(&clock, day(), &hourly(), &intervals);
        let occupied: Vec<i32> = grid.iter().filter(|s| s.occupied).map(|s| s.start_minute).collect();
        assert_eq!(occupied, vec![1080, 1140]);
        assert_eq!(grid.len(), 24);
    }

    #[test]
    fn players_are_grouped_under_their_reservation() {
        let row = |id| LedgerRow {
            id,
            facility_id: 1,
            pitch_id: 1,
            pitch_name: "Saha 1".into(),
            membership_id: 1,
            member_user_id: 1,
            member_username: None,
            start_time: utc("2026-01-04T15:00:00Z"),
            end_time: utc("2026-01-04T16:00:00Z"),
            status: crate::models::reservation::ReservationStatus::Confirmed,
            total_price: Default::default(),
            currency: "TRY".into(),
            shuttle_requested: false,
            payment_status: None,
            players: Vec::new(),
        };
        let player = |id, reservation_id| LedgerPlayer {
            id,
            reservation_id,
            full_name: format!("P{}", id),
            jersey_no: None,
            paid: false,
        };

        let mut rows = vec![row(1), row(2)];
        attach_players(&mut rows, vec![player(10, 2), player(11, 1), player(12, 2)]);

        assert_eq!(rows[0].players.iter().map(|p| p.id).collect::<Vec<_>>(), vec![11]);
        assert_eq!(rows[1].players.iter().map(|p| p.id).collect::<Vec<_>>(), vec![10, 12]);
    }

    proptest! {
        #[test]
        fn offsets_stay_inside_the_day(start_hour in -30i64..50, hours in 1i64..10) {
            let clock = FacilityClock::default();
            let start = utc("2026-01-03T21:00:00Z") + Duration::hours(start_hour);
            let intervals = vec![BusyInterval { start_time: start, end_time: start + Duration::hours(hours) }];
            for offset in busy_offsets(&clock, day(), &hourly(), &intervals) {
                prop_assert!((0..MINUTES_PER_DAY).contains(&offset));
                prop_assert_eq!(offset % 60, 0);
            }
        }
    }
}
