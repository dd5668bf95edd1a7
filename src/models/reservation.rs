// src/models/reservation.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Enums (Postgres types) ---

// CREATED -> CONFIRMED -> COMPLETED, any -> CANCELLED. CANCELLED and COMPLETED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reservation_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Created,
    Confirmed,
    Cancelled,
    Completed,
}

impl ReservationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ReservationStatus::Cancelled | ReservationStatus::Completed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Init,
    Paid,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "video_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VideoStatus {
    Published,
    Hidden,
    Processing,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: i64,
    pub pitch_id: i64,
    pub membership_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    #[schema(value_type = String, example = "200.00")]
    pub total_price: Decimal,
    #[schema(example = "TRY")]
    pub currency: String,
    pub shuttle_requested: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReservationPlayer {
    pub id: i64,
    pub reservation_id: i64,
    #[schema(example = "Ali Yılmaz")]
    pub full_name: String,
    #[schema(example = 10)]
    pub jersey_no: Option<i32>,
    pub paid: bool,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub reservation_id: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    #[schema(value_type = String, example = "200.00")]
    pub amount: Decimal,
    pub currency: String,
    pub provider_ref: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchVideo {
    pub id: i64,
    pub reservation_id: i64,
    pub status: VideoStatus,
    #[schema(example = "https://cdn.ehalisaha.local/videos/42.mp4")]
    pub storage_url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// --- Booking input ---

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPlayer {
    pub full_name: String,
    pub jersey_no: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub pitch_id: i64,
    pub start_time: DateTime<Utc>,
    /// `None` books exactly one slot.
    pub duration_minutes: Option<i32>,
    pub payment_method: PaymentMethod,
    pub players: Vec<NewPlayer>,
    pub shuttle: Option<bool>,
}

/// A created booking as returned to the member.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub players: Vec<ReservationPlayer>,
    pub payment: Payment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_reservation_states() {
        assert!(!ReservationStatus::Created.is_terminal());
        assert!(!ReservationStatus::Confirmed.is_terminal());
        assert!(ReservationStatus::Cancelled.is_terminal());
        assert!(ReservationStatus::Completed.is_terminal());
    }

    #[test]
    fn payment_method_reads_upper_case() {
        let m: PaymentMethod = serde_json::from_str("\"CARD\"").unwrap();
        assert_eq!(m, PaymentMethod::Card);
        assert!(serde_json::from_str::<PaymentMethod>("\"card\"").is_err());
    }
}
