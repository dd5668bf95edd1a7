// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

pub const MINUTES_PER_DAY: i32 = 24 * 60;

// ---
// 1. Facility / Pitch (read-only reference data)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: i64,
    pub owner_user_id: i64,
    #[schema(example = "Yıldız Halı Saha")]
    pub name: String,
    #[serde(skip_serializing)]
    pub name_key: String,
    pub address: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pitch {
    pub id: i64,
    pub facility_id: i64,
    #[schema(example = "Saha 1")]
    pub name: String,
    #[serde(skip_serializing)]
    pub name_key: String,
    // Inactive pitches are hidden from the public catalog only
    pub active: bool,
}

// ---
// 2. Slots
// ---
// A stored row. `id` is absent for virtual defaults, so the view type below is what leaves the service.
#[derive(Debug, Clone, FromRow)]
pub struct FacilitySlot {
    pub id: i64,
    pub facility_id: i64,
    pub start_minute: i32,
    pub duration_minutes: i32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub id: Option<i64>,
    #[schema(example = 1080)]
    pub start_minute: i32,
    #[schema(example = 60)]
    pub duration_minutes: i32,
    pub active: bool,
    #[schema(example = "18:00-19:00")]
    pub label: String,
}

impl SlotView {
    pub fn new(id: Option<i64>, start_minute: i32, duration_minutes: i32, active: bool) -> Self {
        Self {
            id,
            start_minute,
            duration_minutes,
            active,
            label: slot_label(start_minute, duration_minutes),
        }
    }
}

impl From<&FacilitySlot> for SlotView {
    fn from(s: &FacilitySlot) -> Self {
        SlotView::new(Some(s.id), s.start_minute, s.duration_minutes, s.active)
    }
}

/// One entry of the owner's desired slot set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SlotInput {
    #[schema(example = 1080)]
    pub start_minute: i32,
    #[schema(example = 60)]
    pub duration_minutes: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// "HH:MM-HH:MM", wrapping past midnight.
pub fn slot_label(start_minute: i32, duration_minutes: i32) -> String {
    format!(
        "{}-{}",
        clock(start_minute),
        clock(start_minute + duration_minutes)
    )
}

fn clock(minute: i32) -> String {
    let h = (minute / 60) % 24;
    let m = minute % 60;
    format!("{:02}:{:02}", h, m)
}

// ---
// 3. Pricing
// ---
#[derive(Debug, Clone, FromRow)]
pub struct DurationOption {
    pub id: i64,
    pub minutes: i32,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingRule {
    pub id: i64,
    pub pitch_id: i64,
    pub duration_option_id: i64,
    #[schema(example = 60)]
    pub minutes: i32,
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,
    #[schema(example = "TRY")]
    pub currency: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePrice {
    pub price: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub pitch_id: i64,
    pub base_minutes: i32,
    #[schema(value_type = String, example = "100.00")]
    pub base_price: Decimal,
    pub currency: String,
    pub total_minutes: i32,
    #[schema(value_type = String, example = "200.00")]
    pub total_price: Decimal,
}
