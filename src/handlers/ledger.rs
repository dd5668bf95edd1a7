// src/handlers/ledger.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        ledger::{LedgerRow, NewReservationCount, Occupancy, OwnerReservationRow, SlotAvailability},
        reservation::ReservationPlayer,
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DayQuery {
    /// Facility-local calendar day.
    #[param(value_type = String, format = Date, example = "2026-01-04")]
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LedgerQuery {
    #[param(value_type = String, format = Date, example = "2026-01-04")]
    pub date: NaiveDate,
    pub pitch_id: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OwnerReservationsQuery {
    #[param(value_type = String, format = Date, example = "2026-01-04")]
    pub date: NaiveDate,
    pub facility_id: Option<i64>,
    pub pitch_id: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NewCountQuery {
    /// Highest id the client has already seen.
    pub after_id: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPlayerPaidPayload {
    pub paid: bool,
}

// =============================================================================
//  PUBLIC GRIDS
// =============================================================================

// GET /api/public/pitches/{id}/occupancy
#[utoipa::path(
    get,
    path = "/api/public/pitches/{id}/occupancy",
    tag = "Availability",
    params(("id" = i64, Path, description = "Pitch id"), DayQuery),
    responses((status = 200, description = "Busy base-slot offsets of the day", body = Occupancy))
)]
pub async fn pitch_occupancy(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(pitch_id): Path<i64>,
    Query(query): Query<DayQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let occupancy = app_state
        .ledger_service
        .occupancy(pitch_id, query.date)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(occupancy))
}

// GET /api/public/pitches/{id}/availability
#[utoipa::path(
    get,
    path = "/api/public/pitches/{id}/availability",
    tag = "Availability",
    params(("id" = i64, Path, description = "Pitch id"), DayQuery),
    responses((status = 200, description = "Active slots with an occupied flag", body = Vec<SlotAvailability>))
)]
pub async fn pitch_availability(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(pitch_id): Path<i64>,
    Query(query): Query<DayQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let grid = app_state
        .ledger_service
        .availability(pitch_id, query.date)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(grid))
}

// =============================================================================
//  OWNER
// =============================================================================

// GET /api/owner/facilities/{id}/ledger
#[utoipa::path(
    get,
    path = "/api/owner/facilities/{id}/ledger",
    tag = "Ledger",
    params(("id" = i64, Path, description = "Facility id"), LedgerQuery),
    responses(
        (status = 200, description = "Reservations of the day with players", body = Vec<LedgerRow>),
        (status = 403, description = "Not your facility")
    ),
    security(("api_jwt" = []))
)]
pub async fn day_ledger(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(facility_id): Path<i64>,
    Query(query): Query<LedgerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .ledger_service
        .day_ledger(user.0.id, facility_id, query.pitch_id, query.date)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

// GET /api/owner/reservations
#[utoipa::path(
    get,
    path = "/api/owner/reservations",
    tag = "Ledger",
    params(OwnerReservationsQuery),
    responses((status = 200, description = "Live reservations of the day with payment status", body = Vec<OwnerReservationRow>)),
    security(("api_jwt" = []))
)]
pub async fn list_owner_reservations(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<OwnerReservationsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = app_state
        .ledger_service
        .list_for_owner(user.0.id, query.date, query.facility_id, query.pitch_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rows))
}

// GET /api/owner/reservations/new-count
#[utoipa::path(
    get,
    path = "/api/owner/reservations/new-count",
    tag = "Ledger",
    params(NewCountQuery),
    responses((status = 200, description = "Reservations newer than afterId", body = NewReservationCount)),
    security(("api_jwt" = []))
)]
pub async fn new_reservation_count(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<NewCountQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let counter = app_state
        .ledger_service
        .new_reservation_count(user.0.id, query.after_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(counter))
}

// PATCH /api/owner/reservations/{rid}/players/{pid}
#[utoipa::path(
    patch,
    path = "/api/owner/reservations/{rid}/players/{pid}",
    tag = "Ledger",
    request_body = SetPlayerPaidPayload,
    params(
        ("rid" = i64, Path, description = "Reservation id"),
        ("pid" = i64, Path, description = "Player id")
    ),
    responses((status = 200, description = "Player after the change", body = ReservationPlayer)),
    security(("api_jwt" = []))
)]
pub async fn set_player_paid(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path((reservation_id, player_id)): Path<(i64, i64)>,
    Json(payload): Json<SetPlayerPaidPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let player = app_state
        .ledger_service
        .set_player_paid(user.0.id, reservation_id, player_id, payload.paid)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(player))
}
