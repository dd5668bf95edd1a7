// src/db/ledger_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::ledger::{BusyInterval, LedgerPlayer, LedgerRow, OwnerReservationRow},
};

// Read models for the owner's screens. Ownership is checked by the caller first.
#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Reservations of the facility intersecting `[from, to)`, every status.
    pub async fn day_rows(
        &self,
        facility_id: i64,
        pitch_id: Option<i64>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LedgerRow>, AppError> {
        let rows = sqlx::query_as::<_, LedgerRow>(
            r#"
            SELECT
                r.id,
                p.facility_id,
                r.pitch_id,
                p.name AS pitch_name,
                r.membership_id,
                m.user_id AS member_user_id,
                u.username AS member_username,
                r.start_time,
                r.end_time,
                r.status,
                r.total_price,
                r.currency,
                r.shuttle_requested,
                pay.status AS payment_status
            FROM reservations r
            JOIN pitches p ON p.id = r.pitch_id
            JOIN memberships m ON m.id = r.membership_id
            LEFT JOIN app_users u ON u.id = m.user_id
            LEFT JOIN payments pay ON pay.reservation_id = r.id
            WHERE p.facility_id = $1
              AND ($2::BIGINT IS NULL OR r.pitch_id = $2)
              AND r.start_time < $4
              AND r.end_time > $3
            ORDER BY r.start_time ASC, r.id ASC
            "#,
        )
        .bind(facility_id)
        .bind(pitch_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Non-cancelled reservations of the owner's facilities intersecting `[from, to)`.
    pub async fn owner_rows(
        &self,
        owner_user_id: i64,
        facility_id: Option<i64>,
        pitch_id: Option<i64>,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<OwnerReservationRow>, AppError> {
        let rows = sqlx::query_as::<_, OwnerReservationRow>(
            r#"
            SELECT
                r.id,
                p.facility_id,
                r.pitch_id,
                p.name AS pitch_name,
                r.start_time,
                r.end_time,
                r.status,
                r.total_price,
                r.currency,
                COALESCE(pay.status, 'INIT'::payment_status) AS payment_status
            FROM reservations r
            JOIN pitches p ON p.id = r.pitch_id
            JOIN facilities f ON f.id = p.facility_id
            LEFT JOIN payments pay ON pay.reservation_id = r.id
            WHERE f.owner_user_id = $1
              AND ($2::BIGINT IS NULL OR p.facility_id = $2)
              AND ($3::BIGINT IS NULL OR r.pitch_id = $3)
              AND r.status <> 'CANCELLED'
              AND r.start_time < $5
              AND r.end_time > $4
            ORDER BY r.start_time ASC, r.id ASC
            "#,
        )
        .bind(owner_user_id)
        .bind(facility_id)
        .bind(pitch_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn players_for(&self, reservation_ids: &[i64]) -> Result<Vec<LedgerPlayer>, AppError> {
        if reservation_ids.is_empty() {
            return Ok(Vec::new());
        }
        let players = sqlx::query_as::<_, LedgerPlayer>(
            r#"
            SELECT id, reservation_id, full_name, jersey_no, paid
            FROM reservation_players
            WHERE reservation_id = ANY($1)
            ORDER BY reservation_id ASC, position ASC, id ASC
            "#,
        )
        .bind(reservation_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(players)
    }

    /// Non-cancelled intervals of one pitch intersecting `[from, to)`.
    pub async fn busy_intervals(
        &self,
        pitch_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, AppError> {
        let intervals = sqlx::query_as::<_, BusyInterval>(
            r#"
            SELECT start_time, end_time
            FROM reservations
            WHERE pitch_id = $1
              AND status <> 'CANCELLED'
              AND start_time < $3
              AND end_time > $2
            ORDER BY start_time ASC
            "#,
        )
        .bind(pitch_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(intervals)
    }

    /// `(max_id, count above after_id)` over the owner's live reservations.
    pub async fn owner_counter(&self, owner_user_id: i64, after_id: i64) -> Result<(i64, i64), AppError> {
        let counter = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                COALESCE(MAX(r.id), 0)::BIGINT AS max_id,
                COUNT(*) FILTER (WHERE r.id > $2) AS new_count
            FROM reservations r
            JOIN pitches p ON p.id = r.pitch_id
            JOIN facilities f ON f.id = p.facility_id
            WHERE f.owner_user_id = $1
              AND r.status <> 'CANCELLED'
            "#,
        )
        .bind(owner_user_id)
        .bind(after_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(counter)
    }
}
