// src/db/video_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};

use crate::{common::error::AppError, models::reservation::MatchVideo};

#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Publishes the video once per reservation. Returns false if it already existed.
    pub async fn publish_if_absent<'e, E>(
        &self,
        executor: E,
        reservation_id: i64,
        storage_url: &str,
        published_at: DateTime<Utc>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO match_videos (reservation_id, status, storage_url, published_at)
            VALUES ($1, 'PUBLISHED', $2, $3)
            ON CONFLICT (reservation_id) DO NOTHING
            "#,
        )
        .bind(reservation_id)
        .bind(storage_url)
        .bind(published_at)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    // Published videos of every reservation booked through the user's memberships
    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<MatchVideo>, AppError> {
        let videos = sqlx::query_as::<_, MatchVideo>(
            r#"
            SELECT v.*
            FROM match_videos v
            JOIN reservations r ON r.id = v.reservation_id
            JOIN memberships m ON m.id = r.membership_id
            WHERE m.user_id = $1 AND v.status = 'PUBLISHED'
            ORDER BY r.start_time DESC, v.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(videos)
    }
}
