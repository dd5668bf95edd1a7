// src/services/reservation_service.rs

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, time::FacilityClock},
    db::{NewReservation, ReservationRepository},
    models::{
        catalog::SlotView,
        reservation::{
            BookingReceipt, BookingRequest, NewPlayer, PaymentMethod, PaymentStatus, Reservation,
            ReservationPlayer, ReservationStatus,
        },
    },
    services::{
        audit::{AuditEvent, AuditLog},
        catalog_service::CatalogService,
        membership_service::MembershipService,
        pricing_service::{duration_multiplier, total_price, PricingService},
        slot_service::SlotService,
    },
};

// =============================================================================
//  1. PLANNING (pure)
// =============================================================================

/// Time window of a booking, resolved against the facility's slot grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub base_minutes: i32,
    pub total_minutes: i32,
    pub multiplier: i32,
}

/// Aligns the start to an active slot and validates the requested length.
///
/// The local wall-clock minute of the start must equal the start of an active slot.
/// Seconds are ignored for the match; the window still begins at the submitted instant.
/// Without an explicit duration the booking lasts exactly one slot. Otherwise the
/// duration has to be a positive whole multiple of that slot.
pub fn plan_booking(
    clock: &FacilityClock,
    active_slots: &[SlotView],
    start_time: DateTime<Utc>,
    requested_minutes: Option<i32>,
) -> Result<BookingWindow, AppError> {
    let minute = clock.minute_of_day(start_time);

    let slot = active_slots
        .iter()
        .find(|s| s.active && s.start_minute == minute)
        .ok_or(AppError::NoMatchingSlot(minute))?;

    let base_minutes = slot.duration_minutes;
    let total_minutes = requested_minutes.unwrap_or(base_minutes);
    let multiplier = duration_multiplier(total_minutes, base_minutes)?;

    Ok(BookingWindow {
        start_time,
        end_time: start_time + Duration::minutes(total_minutes as i64),
        base_minutes,
        total_minutes,
        multiplier,
    })
}

/// Card payments are settled on the spot by the simulated gateway; cash waits for the owner.
pub fn initial_states(method: PaymentMethod) -> (ReservationStatus, PaymentStatus) {
    match method {
        PaymentMethod::Card => (ReservationStatus::Confirmed, PaymentStatus::Paid),
        PaymentMethod::Cash => (ReservationStatus::Created, PaymentStatus::Init),
    }
}

pub fn simulated_provider_ref() -> String {
    format!("SIM-{}", Uuid::new_v4())
}

/// Audit record of a stored booking.
pub fn booking_audit_event(
    user_id: i64,
    facility_id: i64,
    reservation: &Reservation,
    window: &BookingWindow,
    method: PaymentMethod,
) -> AuditEvent {
    AuditEvent::new(
        user_id,
        "RESERVATION_CREATE",
        "Reservation",
        reservation.id,
        format!(
            "facility={} pitch={} start={} minutes={} base={} x{} method={:?} shuttle={} total={}",
            facility_id,
            reservation.pitch_id,
            window.start_time.to_rfc3339(),
            window.total_minutes,
            window.base_minutes,
            window.multiplier,
            method,
            reservation.shuttle_requested,
            reservation.total_price
        ),
    )
}

// =============================================================================
//  2. SERVICE
// =============================================================================

#[derive(Clone)]
pub struct ReservationService {
    catalog: CatalogService,
    slots: SlotService,
    pricing: PricingService,
    memberships: MembershipService,
    repo: ReservationRepository,
    audit: AuditLog,
    clock: FacilityClock,
    pool: PgPool,
}

impl ReservationService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        catalog: CatalogService,
        slots: SlotService,
        pricing: PricingService,
        memberships: MembershipService,
        repo: ReservationRepository,
        audit: AuditLog,
        clock: FacilityClock,
        pool: PgPool,
    ) -> Self {
        Self { catalog, slots, pricing, memberships, repo, audit, clock, pool }
    }

    pub async fn create_reservation(
        &self,
        user_id: i64,
        request: BookingRequest,
    ) -> Result<BookingReceipt, AppError> {
        // 1. Pitch and its facility
        let (pitch, facility) = self.catalog.pitch(request.pitch_id).await?;

        // 2. Membership gate
        let membership = self.memberships.active_membership(user_id, facility.id).await?;

        // 3-4, 6. Slot alignment, duration, end time
        let slots = self.slots.bookable_slots(facility.id).await?;
        let window = plan_booking(&self.clock, &slots, request.start_time, request.duration_minutes)?;

        // 5. Price
        let base = self.pricing.get_base_price(pitch.id, window.base_minutes).await?;
        let total = total_price(base.price, window.multiplier);

        // 7. Payment outcome
        let (reservation_status, payment_status) = initial_states(request.payment_method);
        let (provider_ref, paid_at) = match payment_status {
            PaymentStatus::Paid => (Some(simulated_provider_ref()), Some(Utc::now())),
            _ => (None, None),
        };

        // 8. Reservation, players, payment: all or nothing
        let mut tx = self.pool.begin().await?;

        let reservation = self
            .repo
            .insert(
                &mut *tx,
                &NewReservation {
                    pitch_id: pitch.id,
                    membership_id: membership.id,
                    start_time: window.start_time,
                    end_time: window.end_time,
                    status: reservation_status,
                    total_price: total,
                    currency: base.currency.clone(),
                    shuttle_requested: request.shuttle.unwrap_or(false),
                },
            )
            .await?; // 9. BookingConflict drops the transaction

        let mut players = Vec::with_capacity(request.players.len());
        for (position, player) in request.players.iter().enumerate() {
            players.push(
                self.repo
                    .insert_player(&mut *tx, reservation.id, player, position as i32)
                    .await?,
            );
        }

        let payment = self
            .repo
            .insert_payment(
                &mut *tx,
                reservation.id,
                request.payment_method,
                payment_status,
                total,
                &base.currency,
                provider_ref.as_deref(),
                paid_at,
            )
            .await?;

        tx.commit().await?;

        // 10. Audit after commit
        tracing::info!(
            "Reservation {} created on pitch {} ({} -> {}, {} {}, {:?})",
            reservation.id,
            pitch.id,
            window.start_time,
            window.end_time,
            total,
            base.currency,
            reservation.status
        );
        self.audit.emit(booking_audit_event(
            user_id,
            facility.id,
            &reservation,
            &window,
            request.payment_method,
        ));

        Ok(BookingReceipt { reservation, players, payment })
    }

    // =========================================================================
    //  OWNER ACTIONS
    // =========================================================================

    /// Cash collected at the desk: payment PAID, reservation CONFIRMED.
    pub async fn mark_cash_paid(&self, owner_id: i64, reservation_id: i64) -> Result<BookingReceipt, AppError> {
        let mut tx = self.pool.begin().await?;

        let reservation = self
            .repo
            .lock(&mut *tx, reservation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reservation".into()))?;
        self.catalog.owned_pitch(owner_id, reservation.pitch_id).await?;

        if reservation.status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "reservation is {:?}",
                reservation.status
            )));
        }

        let payment = self
            .repo
            .find_payment(&mut *tx, reservation.id)
            .await?
            .ok_or_else(|| AppError::InvalidState("reservation has no payment".into()))?;

        let payment = if payment.status == PaymentStatus::Paid {
            payment
        } else {
            self.repo.mark_payment_paid(&mut *tx, payment.id, Utc::now()).await?
        };
        let reservation = self
            .repo
            .set_status(&mut *tx, reservation.id, ReservationStatus::Confirmed)
            .await?;

        tx.commit().await?;

        tracing::info!("Reservation {} paid in cash and confirmed", reservation.id);
        self.audit.emit(AuditEvent::new(owner_id, "CASH_PAID", "Reservation", reservation.id, "confirmed"));

        let players = self.repo.list_players(reservation.id).await?;
        Ok(BookingReceipt { reservation, players, payment })
    }

    pub async fn cancel_reservation(&self, owner_id: i64, reservation_id: i64) -> Result<Reservation, AppError> {
        let reservation = self
            .repo
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reservation".into()))?;
        self.catalog.owned_pitch(owner_id, reservation.pitch_id).await?;

        let cancelled = self
            .repo
            .set_status(&self.pool, reservation.id, ReservationStatus::Cancelled)
            .await?;

        tracing::info!("Reservation {} cancelled by owner {}", reservation.id, owner_id);
        self.audit.emit(AuditEvent::new(
            owner_id,
            "RESERVATION_CANCEL",
            "Reservation",
            reservation.id,
            "cancelled",
        ));

        Ok(cancelled)
    }

    // =========================================================================
    //  MEMBER PLAYERS
    // =========================================================================

    pub async fn add_player(
        &self,
        user_id: i64,
        reservation_id: i64,
        player: &NewPlayer,
    ) -> Result<ReservationPlayer, AppError> {
        let reservation = self.own_reservation(user_id, reservation_id).await?;

        let mut tx = self.pool.begin().await?;
        // Serializes position allocation
        self.repo.lock(&mut *tx, reservation.id).await?;
        let position = self.repo.next_player_position(&mut *tx, reservation.id).await?;
        let added = self.repo.insert_player(&mut *tx, reservation.id, player, position).await?;
        tx.commit().await?;

        tracing::info!("Player {} added to reservation {}", added.id, reservation.id);
        Ok(added)
    }

    pub async fn list_players(&self, user_id: i64, reservation_id: i64) -> Result<Vec<ReservationPlayer>, AppError> {
        let reservation = self.own_reservation(user_id, reservation_id).await?;
        self.repo.list_players(reservation.id).await
    }

    // A member may only touch reservations booked under their own membership
    async fn own_reservation(&self, user_id: i64, reservation_id: i64) -> Result<Reservation, AppError> {
        let reservation = self
            .repo
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Reservation".into()))?;
        let membership = self.memberships.membership(reservation.membership_id).await?;
        if membership.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        Ok(reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn hourly() -> Vec<SlotView> {
        crate::services::slot_service::virtual_default_slots()
    }

    // 18:00 Istanbul
    const EVENING: &str = "2026-01-04T15:00:00Z";

    #[test]
    fn two_hour_booking_on_an_hourly_grid() {
        let clock = FacilityClock::default();
        let window = plan_booking(&clock, &hourly(), utc(EVENING), Some(120)).unwrap();
        assert_eq!(window.base_minutes, 60);
        assert_eq!(window.multiplier, 2);
        assert_eq!(window.end_time, utc("2026-01-04T17:00:00Z"));
    }

    #[test]
    fn missing_duration_books_one_slot() {
        let clock = FacilityClock::default();
        let window = plan_booking(&clock, &hourly(), utc(EVENING), None).unwrap();
        assert_eq!(window.total_minutes, 60);
        assert_eq!(window.end_time, utc("2026-01-04T16:00:00Z"));
    }

    #[test]
    fn off_by_one_minute_does_not_match_a_slot() {
        let clock = FacilityClock::default();
        for start in ["2026-01-04T15:01:00Z", "2026-01-04T14:59:00Z"] {
            assert!(matches!(
                plan_booking(&clock, &hourly(), utc(start), None),
                Err(AppError::NoMatchingSlot(_))
            ));
        }
    }

    #[test]
    fn seconds_past_the_slot_start_still_match() {
        let clock = FacilityClock::default();
        let start = utc("2026-01-04T15:00:30Z");
        let window = plan_booking(&clock, &hourly(), start, None).unwrap();
        assert_eq!(window.start_time, start);
        assert_eq!(window.end_time, utc("2026-01-04T16:00:30Z"));
    }

    #[test]
    fn inactive_slot_is_not_bookable() {
        let clock = FacilityClock::default();
        let slots = vec![SlotView::new(Some(1), 1080, 60, false)];
        assert!(matches!(
            plan_booking(&clock, &slots, utc(EVENING), None),
            Err(AppError::NoMatchingSlot(1080))
        ));
    }

    #[test]
    fn slot_check_runs_before_duration_check() {
        let clock = FacilityClock::default();
        let err = plan_booking(&clock, &hourly(), utc("2026-01-04T15:30:00Z"), Some(45)).unwrap_err();
        assert!(matches!(err, AppError::NoMatchingSlot(1110)));
    }

    #[test]
    fn ninety_minute_slots_take_multiples_of_ninety() {
        let clock = FacilityClock::default();
        let slots = vec![SlotView::new(Some(1), 1080, 90, true)];
        assert_eq!(plan_booking(&clock, &slots, utc(EVENING), Some(180)).unwrap().multiplier, 2);
        assert!(matches!(
            plan_booking(&clock, &slots, utc(EVENING), Some(120)),
            Err(AppError::InvalidDuration(_))
        ));
    }

    #[test]
    fn bookings_longer_than_a_day_are_only_held_to_the_multiple_rule() {
        let clock = FacilityClock::default();
        let window = plan_booking(&clock, &hourly(), utc(EVENING), Some(2880)).unwrap();
        assert_eq!(window.multiplier, 48);
        assert!(matches!(
            plan_booking(&clock, &hourly(), utc(EVENING), Some(0)),
            Err(AppError::InvalidDuration(_))
        ));
    }

    #[test]
    fn card_confirms_and_cash_waits() {
        assert_eq!(
            initial_states(PaymentMethod::Card),
            (ReservationStatus::Confirmed, PaymentStatus::Paid)
        );
        assert_eq!(
            initial_states(PaymentMethod::Cash),
            (ReservationStatus::Created, PaymentStatus::Init)
        );
    }

    #[test]
    fn booking_audit_names_the_whole_request() {
        let clock = FacilityClock::default();
        let window = plan_booking(&clock, &hourly(), utc(EVENING), Some(120)).unwrap();
        let reservation = Reservation {
            id: 77,
            pitch_id: 5,
            membership_id: 9,
            start_time: window.start_time,
            end_time: window.end_time,
            status: ReservationStatus::Confirmed,
            total_price: "200.00".parse().unwrap(),
            currency: "TRY".into(),
            shuttle_requested: true,
            created_at: utc(EVENING),
        };

        let event = booking_audit_event(3, 2, &reservation, &window, PaymentMethod::Card);

        assert_eq!(event.actor_user_id, 3);
        assert_eq!(event.action, "RESERVATION_CREATE");
        assert_eq!(event.entity_id, Some(77));
        assert_eq!(
            event.detail,
            "facility=2 pitch=5 start=2026-01-04T15:00:00+00:00 minutes=120 base=60 x2 method=Card shuttle=true total=200.00"
        );
    }

    #[test]
    fn provider_ref_is_a_prefixed_uuid() {
        let reference = simulated_provider_ref();
        let uuid = reference.strip_prefix("SIM-").unwrap();
        assert!(Uuid::parse_str(uuid).is_ok());
    }

    proptest! {
        #[test]
        fn planned_window_always_spans_whole_slots(hour in 0i64..24, slots_booked in 1i32..6) {
            let clock = FacilityClock::default();
            let start = utc("2026-01-03T21:00:00Z") + Duration::hours(hour);
            let window = plan_booking(&clock, &hourly(), start, Some(slots_booked * 60)).unwrap();
            prop_assert_eq!(window.end_time - window.start_time, Duration::minutes((slots_booked * 60) as i64));
            prop_assert_eq!(window.multiplier, slots_booked);
        }
    }
}
