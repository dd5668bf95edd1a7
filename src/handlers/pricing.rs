// src/handlers/pricing.rs

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::catalog::{PriceQuote, PricingRule},
};

fn non_negative(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        return Err(ValidationError::new("negative_price"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPricingPayload {
    pub pitch_id: i64,

    /// Must be on the duration-option menu.
    #[schema(example = 60)]
    pub duration_minutes: i32,

    #[validate(custom(function = "non_negative"))]
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,

    #[validate(length(equal = 3, message = "iso_code"))]
    #[schema(example = "TRY")]
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PriceQuery {
    /// Defaults to one base slot.
    pub total_minutes: Option<i32>,
}

// GET /api/public/pitches/{id}/price
#[utoipa::path(
    get,
    path = "/api/public/pitches/{id}/price",
    tag = "Pricing",
    params(("id" = i64, Path, description = "Pitch id"), PriceQuery),
    responses(
        (status = 200, description = "Price for the requested length", body = PriceQuote),
        (status = 400, description = "Invalid duration or no price configured")
    )
)]
pub async fn get_price_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(pitch_id): Path<i64>,
    Query(query): Query<PriceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = app_state
        .pricing_service
        .quote(pitch_id, query.total_minutes)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(quote))
}

// GET /api/owner/pitches/{id}/pricing
#[utoipa::path(
    get,
    path = "/api/owner/pitches/{id}/pricing",
    tag = "Pricing",
    params(("id" = i64, Path, description = "Pitch id")),
    responses((status = 200, description = "Every rule of the pitch", body = Vec<PricingRule>)),
    security(("api_jwt" = []))
)]
pub async fn list_pitch_pricing(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(pitch_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let rules = app_state
        .pricing_service
        .list_for_owner(user.0.id, pitch_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rules))
}

// PUT /api/owner/pricing
#[utoipa::path(
    put,
    path = "/api/owner/pricing",
    tag = "Pricing",
    request_body = UpsertPricingPayload,
    responses(
        (status = 200, description = "Active rule after the update", body = PricingRule),
        (status = 400, description = "Duration is not offered")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_pricing(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<UpsertPricingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let rule = app_state
        .pricing_service
        .upsert(user.0.id, payload.pitch_id, payload.duration_minutes, payload.price, payload.currency)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(rule))
}
