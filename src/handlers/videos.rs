// src/handlers/videos.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::reservation::MatchVideo,
};

// GET /api/member/videos
#[utoipa::path(
    get,
    path = "/api/member/videos",
    tag = "Videos",
    responses((status = 200, description = "Published recordings of the caller's matches", body = Vec<MatchVideo>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_videos(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let videos = app_state
        .completion_service
        .list_my_videos(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(videos))
}
