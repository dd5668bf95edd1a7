use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Typed failures of the booking core plus the ambient ones (validation, auth, storage).
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Invalid token")]
    InvalidToken,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Not your facility")]
    Forbidden,

    #[error("Not an approved member of this facility")]
    NotMember,

    #[error("Membership is not active for this facility")]
    MembershipNotActive,

    #[error("A membership request already exists")]
    DuplicateRequest,

    #[error("Membership already active")]
    AlreadyMember,

    #[error("Request already decided")]
    AlreadyDecided,

    #[error("Start time must match a facility slot (minuteOfDay={0})")]
    NoMatchingSlot(i32),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Pricing not configured for this pitch (base duration={0})")]
    PricingNotConfigured(i32),

    #[error("Reservation overlaps with an existing reservation")]
    BookingConflict,

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    /// Stable code used as the i18n key and as the `code` field of the body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::InvalidToken => "invalid_token",
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden => "forbidden",
            AppError::NotMember => "not_member",
            AppError::MembershipNotActive => "membership_not_active",
            AppError::DuplicateRequest => "duplicate_request",
            AppError::AlreadyMember => "already_member",
            AppError::AlreadyDecided => "already_decided",
            AppError::NoMatchingSlot(_) => "no_matching_slot",
            AppError::InvalidDuration(_) => "invalid_duration",
            AppError::PricingNotConfigured(_) => "pricing_not_configured",
            AppError::BookingConflict => "booking_conflict",
            AppError::InvalidState(_) => "invalid_state",
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::NoMatchingSlot(_)
            | AppError::InvalidDuration(_)
            | AppError::PricingNotConfigured(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden | AppError::NotMember | AppError::MembershipNotActive => {
                StatusCode::FORBIDDEN
            }
            AppError::DuplicateRequest
            | AppError::AlreadyMember
            | AppError::AlreadyDecided
            | AppError::BookingConflict
            | AppError::InvalidState(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converts into the HTTP-facing error, translated for the caller's language.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // The real cause only goes to the log
            match self {
                AppError::DatabaseError(e) => tracing::error!("Database error: {:?}", e),
                AppError::InternalServerError(e) => tracing::error!("Internal error: {:?}", e),
                _ => {}
            }
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut fields = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let codes: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let text = e.message.as_ref().map(|m| m.to_string());
                            Value::String(text.unwrap_or_else(|| e.code.to_string()))
                        })
                        .collect();
                    fields.insert(field.to_string(), Value::Array(codes));
                }
                Some(Value::Object(fields))
            }
            AppError::NotFound(what) => Some(json!({ "resource": what })),
            AppError::NoMatchingSlot(minute) => Some(json!({ "minuteOfDay": minute })),
            AppError::InvalidDuration(reason) => Some(json!({ "reason": reason })),
            AppError::PricingNotConfigured(base) => Some(json!({ "baseMinutes": base })),
            AppError::InvalidState(reason) => Some(json!({ "reason": reason })),
            _ => None,
        };

        ApiError {
            status,
            code: self.code(),
            error: store.message(&locale.0, self.code()),
            details,
        }
    }
}

// What actually goes over the wire
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "code": self.code,
            "error": self.error,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en() -> Locale {
        Locale("en".to_string())
    }

    #[test]
    fn booking_conflict_is_distinct_from_validation() {
        let store = I18nStore::new();
        let conflict = AppError::BookingConflict.to_api_error(&en(), &store);
        let invalid = AppError::InvalidDuration("90 % 60 != 0".into()).to_api_error(&en(), &store);

        assert_eq!(conflict.status, StatusCode::CONFLICT);
        assert_eq!(conflict.code, "booking_conflict");
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
        assert_eq!(invalid.code, "invalid_duration");
    }

    #[test]
    fn admission_failures_are_forbidden() {
        assert_eq!(AppError::NotMember.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::MembershipNotActive.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn workflow_violations_conflict() {
        for e in [AppError::DuplicateRequest, AppError::AlreadyMember, AppError::AlreadyDecided] {
            assert_eq!(e.status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn internal_errors_hide_their_cause() {
        let store = I18nStore::new();
        let err = AppError::InternalServerError(anyhow::anyhow!("pool exhausted on host db-3"));
        let api = err.to_api_error(&en(), &store);

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("db-3"));
        assert!(api.details.is_none());
    }

    #[test]
    fn slot_mismatch_carries_minute_of_day() {
        let store = I18nStore::new();
        let api = AppError::NoMatchingSlot(1081).to_api_error(&en(), &store);
        assert_eq!(api.details, Some(json!({ "minuteOfDay": 1081 })));
    }
}
