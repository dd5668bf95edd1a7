// src/models/ledger.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::reservation::{PaymentStatus, ReservationStatus};

// 1. One line of the owner's day view (players are attached by the service)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRow {
    pub id: i64,
    pub facility_id: i64,
    pub pitch_id: i64,
    pub pitch_name: String,
    pub membership_id: i64,
    pub member_user_id: i64,
    pub member_username: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    #[schema(value_type = String, example = "200.00")]
    pub total_price: Decimal,
    pub currency: String,
    pub shuttle_requested: bool,
    pub payment_status: Option<PaymentStatus>,
    #[sqlx(skip)]
    pub players: Vec<LedgerPlayer>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerPlayer {
    pub id: i64,
    #[serde(skip_serializing)]
    pub reservation_id: i64,
    pub full_name: String,
    pub jersey_no: Option<i32>,
    pub paid: bool,
}

/// Live reservation across all of the owner's facilities. A missing payment reads as INIT.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReservationRow {
    pub id: i64,
    pub facility_id: i64,
    pub pitch_id: i64,
    pub pitch_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    #[schema(value_type = String, example = "200.00")]
    pub total_price: Decimal,
    pub currency: String,
    pub payment_status: PaymentStatus,
}

// 2. Busy/free grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Occupancy {
    pub pitch_id: i64,
    #[schema(value_type = String, format = Date, example = "2026-01-04")]
    pub date: chrono::NaiveDate,
    /// Minute-of-day offsets, each the start of one busy base slot.
    pub busy_minutes: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotAvailability {
    pub start_minute: i32,
    pub duration_minutes: i32,
    pub active: bool,
    pub occupied: bool,
    pub label: String,
}

// 3. Polling counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewReservationCount {
    pub after_id: i64,
    pub max_id: i64,
    pub new_count: i64,
}

// Minimal projection used to build occupancy and availability
#[derive(Debug, Clone, FromRow)]
pub struct BusyInterval {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}
