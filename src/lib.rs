// src/lib.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::{config::AppState, docs::ApiDoc, middleware::auth::auth_guard};

/// The full HTTP surface over a ready state.
pub fn app(app_state: AppState) -> Router {
    // No token needed
    let public_routes = Router::new()
        .route("/facilities/{id}/slots", get(handlers::slots::list_public_slots))
        .route("/pitches/{id}/availability", get(handlers::ledger::pitch_availability))
        .route("/pitches/{id}/occupancy", get(handlers::ledger::pitch_occupancy))
        .route("/pitches/{id}/price", get(handlers::pricing::get_price_quote));

    let member_routes = Router::new()
        .route(
            "/facilities/{id}/membership-requests",
            post(handlers::memberships::request_membership),
        )
        .route("/facilities/{id}/membership", get(handlers::memberships::my_membership))
        .route("/reservations", post(handlers::reservations::create_reservation))
        .route(
            "/reservations/{id}/players",
            get(handlers::reservations::list_players).post(handlers::reservations::add_player),
        )
        .route("/videos", get(handlers::videos::list_my_videos))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let owner_routes = Router::new()
        .route(
            "/facilities/{id}/slots",
            get(handlers::slots::list_owner_slots).put(handlers::slots::replace_slots),
        )
        .route("/facilities/{id}/ledger", get(handlers::ledger::day_ledger))
        .route("/pitches/{id}/pricing", get(handlers::pricing::list_pitch_pricing))
        .route("/pricing", put(handlers::pricing::upsert_pricing))
        .route("/membership-requests", get(handlers::memberships::list_pending_requests))
        .route(
            "/membership-requests/{id}/approve",
            post(handlers::memberships::approve_request),
        )
        .route(
            "/membership-requests/{id}/reject",
            post(handlers::memberships::reject_request),
        )
        .route("/memberships/{id}", patch(handlers::memberships::set_membership_status))
        .route("/reservations", get(handlers::ledger::list_owner_reservations))
        .route("/reservations/new-count", get(handlers::ledger::new_reservation_count))
        .route("/reservations/{id}/cash-paid", post(handlers::reservations::mark_cash_paid))
        .route("/reservations/{id}/cancel", post(handlers::reservations::cancel_reservation))
        .route(
            "/reservations/{rid}/players/{pid}",
            patch(handlers::ledger::set_player_paid),
        )
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/public", public_routes)
        .nest("/api/member", member_routes)
        .nest("/api/owner", owner_routes)
        .with_state(app_state)
}
