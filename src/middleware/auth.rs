// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

// Tokens are issued by the identity service; we only verify them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,   // user id
    pub exp: usize, // expiry (unix seconds)
    #[serde(default)]
    pub role: Option<String>,
}

/// The already-authenticated caller. The core trusts this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
}

pub fn verify_token(token: &str, secret: &str) -> Result<Actor, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        AppError::InvalidToken
    })?;

    Ok(Actor { id: data.claims.sub })
}

// Guard for every /api/member and /api/owner route
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let locale = Locale::from_headers(request.headers());

    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

    let actor = verify_token(bearer.token(), &app_state.settings.jwt_secret)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

// Extractor for handlers behind `auth_guard`
pub struct AuthenticatedUser(pub Actor);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);
        parts
            .extensions
            .get::<Actor>()
            .copied()
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))
    }
}
