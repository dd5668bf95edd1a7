// src/handlers/slots.rs

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::catalog::{SlotInput, SlotView},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceSlotsPayload {
    // Malformed entries are dropped by the service, only the size is bounded here
    #[validate(length(max = 1440, message = "too_many_slots"))]
    pub slots: Vec<SlotInput>,
}

// GET /api/public/facilities/{id}/slots
#[utoipa::path(
    get,
    path = "/api/public/facilities/{id}/slots",
    tag = "Slots",
    params(("id" = i64, Path, description = "Facility id")),
    responses(
        (status = 200, description = "Bookable slots of the facility", body = Vec<SlotView>),
        (status = 404, description = "Unknown facility")
    )
)]
pub async fn list_public_slots(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(facility_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let slots = app_state
        .slot_service
        .list_active_slots(facility_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(slots))
}

// GET /api/owner/facilities/{id}/slots
#[utoipa::path(
    get,
    path = "/api/owner/facilities/{id}/slots",
    tag = "Slots",
    params(("id" = i64, Path, description = "Facility id")),
    responses(
        (status = 200, description = "All slots including inactive ones", body = Vec<SlotView>),
        (status = 403, description = "Not your facility")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_owner_slots(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(facility_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let slots = app_state
        .slot_service
        .list_all_slots(user.0.id, facility_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(slots))
}

// PUT /api/owner/facilities/{id}/slots
#[utoipa::path(
    put,
    path = "/api/owner/facilities/{id}/slots",
    tag = "Slots",
    request_body = ReplaceSlotsPayload,
    params(("id" = i64, Path, description = "Facility id")),
    responses(
        (status = 200, description = "Slot set after reconciliation", body = Vec<SlotView>),
        (status = 403, description = "Not your facility")
    ),
    security(("api_jwt" = []))
)]
pub async fn replace_slots(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(facility_id): Path<i64>,
    Json(payload): Json<ReplaceSlotsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let slots = app_state
        .slot_service
        .replace_slots(user.0.id, facility_id, &payload.slots)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(slots))
}
