// src/models/membership.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Enums (Postgres types) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "membership_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipStatus {
    Active,
    Suspended,
    Cancelled,
}

// PENDING -> APPROVED | REJECTED, one way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "membership_request_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MembershipRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl MembershipRequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, MembershipRequestStatus::Pending)
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: i64,
    pub facility_id: i64,
    pub user_id: i64,
    pub status: MembershipStatus,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRequest {
    pub id: i64,
    pub facility_id: i64,
    pub user_id: i64,
    pub status: MembershipRequestStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<i64>,
}

/// What the member UI needs to pick between "request", "pending" and "member".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipStanding {
    pub facility_id: i64,
    pub membership_id: Option<i64>,
    pub membership_status: Option<MembershipStatus>,
    pub request_status: Option<MembershipRequestStatus>,
}
