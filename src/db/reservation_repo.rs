// src/db/reservation_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::{db_utils::map_overlap, error::AppError},
    models::reservation::{
        NewPlayer, Payment, PaymentMethod, PaymentStatus, Reservation, ReservationPlayer,
        ReservationStatus,
    },
};

/// Row values for a reservation about to be written.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub pitch_id: i64,
    pub membership_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    pub total_price: Decimal,
    pub currency: String,
    pub shuttle_requested: bool,
}

#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  1. RESERVATIONS
    // =========================================================================

    /// Insert guarded by the overlap exclusion constraint.
    pub async fn insert<'e, E>(
        &self,
        executor: E,
        new: &NewReservation,
    ) -> Result<Reservation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (
                pitch_id, membership_id, start_time, end_time,
                status, total_price, currency, shuttle_requested
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.pitch_id)
        .bind(new.membership_id)
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(new.status)
        .bind(new.total_price)
        .bind(&new.currency)
        .bind(new.shuttle_requested)
        .fetch_one(executor)
        .await
        .map_err(map_overlap)
    }

    pub async fn find_by_id(&self, reservation_id: i64) -> Result<Option<Reservation>, AppError> {
        let reservation = sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(reservation_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(reservation)
    }

    pub async fn lock<'e, E>(
        &self,
        executor: E,
        reservation_id: i64,
    ) -> Result<Option<Reservation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservation = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(reservation_id)
        .fetch_optional(executor)
        .await?;
        Ok(reservation)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        reservation_id: i64,
        status: ReservationStatus,
    ) -> Result<Reservation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(reservation_id)
        .bind(status)
        .fetch_one(executor)
        .await
        .map_err(map_overlap)
    }

    /// CONFIRMED reservations whose end has passed, oldest first.
    pub async fn list_confirmed_ended_before(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<i64>, AppError> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM reservations
            WHERE status = 'CONFIRMED' AND end_time < $1
            ORDER BY end_time ASC, id ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    /// CONFIRMED -> COMPLETED. Returns false when another worker got there first.
    pub async fn complete_if_confirmed<'e, E>(
        &self,
        executor: E,
        reservation_id: i64,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE reservations SET status = 'COMPLETED' WHERE id = $1 AND status = 'CONFIRMED'",
        )
        .bind(reservation_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    // =========================================================================
    //  2. PLAYERS
    // =========================================================================

    pub async fn insert_player<'e, E>(
        &self,
        executor: E,
        reservation_id: i64,
        player: &NewPlayer,
        position: i32,
    ) -> Result<ReservationPlayer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, ReservationPlayer>(
            r#"
            INSERT INTO reservation_players (reservation_id, full_name, jersey_no, paid, position)
            VALUES ($1, $2, $3, FALSE, $4)
            RETURNING *
            "#,
        )
        .bind(reservation_id)
        .bind(player.full_name.trim())
        .bind(player.jersey_no)
        .bind(position)
        .fetch_one(executor)
        .await?;
        Ok(row)
    }

    pub async fn next_player_position<'e, E>(
        &self,
        executor: E,
        reservation_id: i64,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let next = sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM reservation_players WHERE reservation_id = $1",
        )
        .bind(reservation_id)
        .fetch_one(executor)
        .await?;
        Ok(next)
    }

    pub async fn list_players(&self, reservation_id: i64) -> Result<Vec<ReservationPlayer>, AppError> {
        let players = sqlx::query_as::<_, ReservationPlayer>(
            r#"
            SELECT * FROM reservation_players
            WHERE reservation_id = $1
            ORDER BY position ASC, id ASC
            "#,
        )
        .bind(reservation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(players)
    }

    pub async fn find_player(&self, player_id: i64) -> Result<Option<ReservationPlayer>, AppError> {
        let player = sqlx::query_as::<_, ReservationPlayer>(
            "SELECT * FROM reservation_players WHERE id = $1",
        )
        .bind(player_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(player)
    }

    pub async fn set_player_paid<'e, E>(
        &self,
        executor: E,
        player_id: i64,
        paid: bool,
    ) -> Result<ReservationPlayer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let player = sqlx::query_as::<_, ReservationPlayer>(
            "UPDATE reservation_players SET paid = $2 WHERE id = $1 RETURNING *",
        )
        .bind(player_id)
        .bind(paid)
        .fetch_one(executor)
        .await?;
        Ok(player)
    }

    // =========================================================================
    //  3. PAYMENTS
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_payment<'e, E>(
        &self,
        executor: E,
        reservation_id: i64,
        method: PaymentMethod,
        status: PaymentStatus,
        amount: Decimal,
        currency: &str,
        provider_ref: Option<&str>,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (reservation_id, method, status, amount, currency, provider_ref, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(reservation_id)
        .bind(method)
        .bind(status)
        .bind(amount)
        .bind(currency)
        .bind(provider_ref)
        .bind(paid_at)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    pub async fn find_payment<'e, E>(
        &self,
        executor: E,
        reservation_id: i64,
    ) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE reservation_id = $1")
            .bind(reservation_id)
            .fetch_optional(executor)
            .await?;
        Ok(payment)
    }

    pub async fn mark_payment_paid<'e, E>(
        &self,
        executor: E,
        payment_id: i64,
        paid_at: DateTime<Utc>,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            "UPDATE payments SET status = 'PAID', paid_at = $2 WHERE id = $1 RETURNING *",
        )
        .bind(payment_id)
        .bind(paid_at)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }
}
