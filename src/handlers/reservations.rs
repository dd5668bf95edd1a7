// src/handlers/reservations.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::reservation::{
        BookingReceipt, BookingRequest, NewPlayer, PaymentMethod, Reservation, ReservationPlayer,
    },
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPayload {
    #[validate(length(min = 1, max = 120, message = "required"))]
    #[schema(example = "Ali Yılmaz")]
    pub full_name: String,

    #[validate(range(min = 0, max = 999, message = "out_of_range"))]
    #[schema(example = 10)]
    pub jersey_no: Option<i32>,
}

impl From<PlayerPayload> for NewPlayer {
    fn from(p: PlayerPayload) -> Self {
        NewPlayer { full_name: p.full_name, jersey_no: p.jersey_no }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationPayload {
    pub pitch_id: i64,

    /// Its local minute must be the start of an active slot.
    #[schema(example = "2026-01-04T15:00:00Z")]
    pub start_time: DateTime<Utc>,

    /// Omit to book exactly one slot. Checked against the slot length by the booking itself.
    #[schema(example = 120)]
    pub duration_minutes: Option<i32>,

    pub payment_method: PaymentMethod,

    #[serde(default)]
    #[validate(length(max = 30, message = "too_many_players"), nested)]
    pub players: Vec<PlayerPayload>,

    pub shuttle: Option<bool>,
}

impl From<CreateReservationPayload> for BookingRequest {
    fn from(p: CreateReservationPayload) -> Self {
        BookingRequest {
            pitch_id: p.pitch_id,
            start_time: p.start_time,
            duration_minutes: p.duration_minutes,
            payment_method: p.payment_method,
            players: p.players.into_iter().map(NewPlayer::from).collect(),
            shuttle: p.shuttle,
        }
    }
}

// =============================================================================
//  MEMBER
// =============================================================================

// POST /api/member/reservations
#[utoipa::path(
    post,
    path = "/api/member/reservations",
    tag = "Reservations",
    request_body = CreateReservationPayload,
    responses(
        (status = 201, description = "Reservation, players and payment", body = BookingReceipt),
        (status = 400, description = "Start not on a slot, bad duration or no price"),
        (status = 403, description = "Not an active member of the facility"),
        (status = 409, description = "Overlaps an existing reservation")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_reservation(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateReservationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let receipt = app_state
        .reservation_service
        .create_reservation(user.0.id, payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

// GET /api/member/reservations/{id}/players
#[utoipa::path(
    get,
    path = "/api/member/reservations/{id}/players",
    tag = "Reservations",
    params(("id" = i64, Path, description = "Reservation id")),
    responses((status = 200, description = "Players in submission order", body = Vec<ReservationPlayer>)),
    security(("api_jwt" = []))
)]
pub async fn list_players(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(reservation_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let players = app_state
        .reservation_service
        .list_players(user.0.id, reservation_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(players))
}

// POST /api/member/reservations/{id}/players
#[utoipa::path(
    post,
    path = "/api/member/reservations/{id}/players",
    tag = "Reservations",
    request_body = PlayerPayload,
    params(("id" = i64, Path, description = "Reservation id")),
    responses(
        (status = 201, description = "Player appended", body = ReservationPlayer),
        (status = 403, description = "Not your reservation")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_player(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(reservation_id): Path<i64>,
    Json(payload): Json<PlayerPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let player = app_state
        .reservation_service
        .add_player(user.0.id, reservation_id, &payload.into())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(player)))
}

// =============================================================================
//  OWNER
// =============================================================================

// POST /api/owner/reservations/{id}/cash-paid
#[utoipa::path(
    post,
    path = "/api/owner/reservations/{id}/cash-paid",
    tag = "Reservations",
    params(("id" = i64, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Payment PAID, reservation CONFIRMED", body = BookingReceipt),
        (status = 409, description = "Reservation has no payment or is closed")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_cash_paid(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(reservation_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let receipt = app_state
        .reservation_service
        .mark_cash_paid(user.0.id, reservation_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(receipt))
}

// POST /api/owner/reservations/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/owner/reservations/{id}/cancel",
    tag = "Reservations",
    params(("id" = i64, Path, description = "Reservation id")),
    responses((status = 200, description = "Reservation CANCELLED", body = Reservation)),
    security(("api_jwt" = []))
)]
pub async fn cancel_reservation(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(reservation_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let reservation = app_state
        .reservation_service
        .cancel_reservation(user.0.id, reservation_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(reservation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: serde_json::Value) -> CreateReservationPayload {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn shuttle_and_players_are_optional() {
        let p = payload(serde_json::json!({
            "pitchId": 1,
            "startTime": "2026-01-04T15:00:00Z",
            "paymentMethod": "CASH"
        }));
        assert!(p.validate().is_ok());

        let request: BookingRequest = p.into();
        assert!(request.players.is_empty());
        assert_eq!(request.shuttle, None);
        assert_eq!(request.duration_minutes, None);
    }

    #[test]
    fn duration_is_left_to_the_slot_rules() {
        for minutes in [0, 90, 2880] {
            let p = payload(serde_json::json!({
                "pitchId": 1,
                "startTime": "2026-01-04T15:00:00Z",
                "durationMinutes": minutes,
                "paymentMethod": "CARD"
            }));
            assert!(p.validate().is_ok(), "{} minutes", minutes);
        }
    }

    #[test]
    fn blank_player_name_is_rejected() {
        let p = payload(serde_json::json!({
            "pitchId": 1,
            "startTime": "2026-01-04T15:00:00Z",
            "paymentMethod": "CARD",
            "players": [{ "fullName": "" }]
        }));
        assert!(p.validate().is_err());
    }
}
