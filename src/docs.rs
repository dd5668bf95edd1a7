// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Slots ---
        handlers::slots::list_public_slots,
        handlers::slots::list_owner_slots,
        handlers::slots::replace_slots,

        // --- Pricing ---
        handlers::pricing::get_price_quote,
        handlers::pricing::list_pitch_pricing,
        handlers::pricing::upsert_pricing,

        // --- Memberships ---
        handlers::memberships::request_membership,
        handlers::memberships::my_membership,
        handlers::memberships::list_pending_requests,
        handlers::memberships::approve_request,
        handlers::memberships::reject_request,
        handlers::memberships::set_membership_status,

        // --- Reservations ---
        handlers::reservations::create_reservation,
        handlers::reservations::list_players,
        handlers::reservations::add_player,
        handlers::reservations::mark_cash_paid,
        handlers::reservations::cancel_reservation,

        // --- Ledger & availability ---
        handlers::ledger::pitch_occupancy,
        handlers::ledger::pitch_availability,
        handlers::ledger::day_ledger,
        handlers::ledger::list_owner_reservations,
        handlers::ledger::new_reservation_count,
        handlers::ledger::set_player_paid,

        // --- Videos ---
        handlers::videos::list_my_videos,
    ),
    components(
        schemas(
            // --- Catalog ---
            models::catalog::Facility,
            models::catalog::Pitch,
            models::catalog::SlotView,
            models::catalog::SlotInput,
            models::catalog::PricingRule,
            models::catalog::PriceQuote,

            // --- Memberships ---
            models::membership::MembershipStatus,
            models::membership::MembershipRequestStatus,
            models::membership::Membership,
            models::membership::MembershipRequest,
            models::membership::MembershipStanding,

            // --- Reservations ---
            models::reservation::ReservationStatus,
            models::reservation::PaymentMethod,
            models::reservation::PaymentStatus,
            models::reservation::VideoStatus,
            models::reservation::Reservation,
            models::reservation::ReservationPlayer,
            models::reservation::Payment,
            models::reservation::MatchVideo,
            models::reservation::BookingReceipt,

            // --- Ledger ---
            models::ledger::LedgerRow,
            models::ledger::LedgerPlayer,
            models::ledger::OwnerReservationRow,
            models::ledger::Occupancy,
            models::ledger::SlotAvailability,
            models::ledger::NewReservationCount,

            // --- Payloads ---
            handlers::slots::ReplaceSlotsPayload,
            handlers::pricing::UpsertPricingPayload,
            handlers::memberships::SetMembershipStatusPayload,
            handlers::reservations::CreateReservationPayload,
            handlers::reservations::PlayerPayload,
            handlers::ledger::SetPlayerPaidPayload,
        )
    ),
    tags(
        (name = "Slots", description = "Facility time grid"),
        (name = "Pricing", description = "Per-pitch tariffs and price quotes"),
        (name = "Memberships", description = "Membership requests and approvals"),
        (name = "Reservations", description = "Booking and owner payment actions"),
        (name = "Availability", description = "Public busy/free grids"),
        (name = "Ledger", description = "Owner day view and counters"),
        (name = "Videos", description = "Recordings of completed matches")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_surface_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/member/reservations",
            "/api/owner/facilities/{id}/ledger",
            "/api/owner/reservations",
            "/api/public/pitches/{id}/availability",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{} missing", path);
        }
    }
}
