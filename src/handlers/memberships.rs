// src/handlers/memberships.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::membership::{Membership, MembershipRequest, MembershipStanding, MembershipStatus},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetMembershipStatusPayload {
    #[schema(example = "SUSPENDED")]
    pub status: MembershipStatus,
}

// =============================================================================
//  MEMBER
// =============================================================================

// POST /api/member/facilities/{id}/membership-requests
#[utoipa::path(
    post,
    path = "/api/member/facilities/{id}/membership-requests",
    tag = "Memberships",
    params(("id" = i64, Path, description = "Facility id")),
    responses(
        (status = 201, description = "Request created as PENDING", body = MembershipRequest),
        (status = 409, description = "Request already exists or already a member")
    ),
    security(("api_jwt" = []))
)]
pub async fn request_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(facility_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let request = app_state
        .membership_service
        .request_membership(user.0.id, facility_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(request)))
}

// GET /api/member/facilities/{id}/membership
#[utoipa::path(
    get,
    path = "/api/member/facilities/{id}/membership",
    tag = "Memberships",
    params(("id" = i64, Path, description = "Facility id")),
    responses((status = 200, description = "Caller's standing at the facility", body = MembershipStanding)),
    security(("api_jwt" = []))
)]
pub async fn my_membership(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(facility_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let standing = app_state
        .membership_service
        .status_for(user.0.id, facility_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(standing))
}

// =============================================================================
//  OWNER
// =============================================================================

// GET /api/owner/membership-requests
#[utoipa::path(
    get,
    path = "/api/owner/membership-requests",
    tag = "Memberships",
    responses((status = 200, description = "Pending requests across owned facilities", body = Vec<MembershipRequest>)),
    security(("api_jwt" = []))
)]
pub async fn list_pending_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let requests = app_state
        .membership_service
        .list_pending_requests(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(requests))
}

// POST /api/owner/membership-requests/{id}/approve
#[utoipa::path(
    post,
    path = "/api/owner/membership-requests/{id}/approve",
    tag = "Memberships",
    params(("id" = i64, Path, description = "Membership request id")),
    responses(
        (status = 200, description = "Membership is ACTIVE", body = Membership),
        (status = 409, description = "Request already decided")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_request(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(request_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = app_state
        .membership_service
        .approve(user.0.id, request_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(membership))
}

// POST /api/owner/membership-requests/{id}/reject
#[utoipa::path(
    post,
    path = "/api/owner/membership-requests/{id}/reject",
    tag = "Memberships",
    params(("id" = i64, Path, description = "Membership request id")),
    responses(
        (status = 200, description = "Request is REJECTED", body = MembershipRequest),
        (status = 409, description = "Request already decided")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_request(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(request_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let request = app_state
        .membership_service
        .reject(user.0.id, request_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(request))
}

// PATCH /api/owner/memberships/{id}
#[utoipa::path(
    patch,
    path = "/api/owner/memberships/{id}",
    tag = "Memberships",
    request_body = SetMembershipStatusPayload,
    params(("id" = i64, Path, description = "Membership id")),
    responses((status = 200, description = "Membership after the change", body = Membership)),
    security(("api_jwt" = []))
)]
pub async fn set_membership_status(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(membership_id): Path<i64>,
    Json(payload): Json<SetMembershipStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let membership = app_state
        .membership_service
        .set_membership_status(user.0.id, membership_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(membership))
}
