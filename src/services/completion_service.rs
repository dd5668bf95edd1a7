// src/services/completion_service.rs

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tokio::task::JoinHandle;

use crate::{
    common::error::AppError,
    db::{ReservationRepository, VideoRepository},
    models::reservation::MatchVideo,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompletionReport {
    pub completed: usize,
    pub videos_published: usize,
}

pub fn video_storage_url(base_url: &str, reservation_id: i64) -> String {
    format!("{}/{}.mp4", base_url.trim_end_matches('/'), reservation_id)
}

/// Retires finished matches and publishes their recordings.
#[derive(Clone)]
pub struct CompletionService {
    reservations: ReservationRepository,
    videos: VideoRepository,
    video_base_url: String,
    pool: PgPool,
}

impl CompletionService {
    pub fn new(
        reservations: ReservationRepository,
        videos: VideoRepository,
        video_base_url: String,
        pool: PgPool,
    ) -> Self {
        Self { reservations, videos, video_base_url, pool }
    }

    /// One sweep. Safe to run concurrently with itself and to repeat.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<CompletionReport, AppError> {
        let due = self.reservations.list_confirmed_ended_before(now).await?;
        let mut report = CompletionReport::default();

        for reservation_id in due {
            match self.complete_one(reservation_id, now).await {
                Ok((completed, published)) => {
                    report.completed += completed as usize;
                    report.videos_published += published as usize;
                }
                Err(e) => {
                    tracing::error!("Could not complete reservation {}: {}", reservation_id, e);
                }
            }
        }

        if report.completed > 0 {
            tracing::info!(
                "Completion sweep: {} reservations completed, {} videos published",
                report.completed,
                report.videos_published
            );
        }
        Ok(report)
    }

    async fn complete_one(&self, reservation_id: i64, now: DateTime<Utc>) -> Result<(bool, bool), AppError> {
        let mut tx = self.pool.begin().await?;

        let completed = self.reservations.complete_if_confirmed(&mut *tx, reservation_id).await?;
        let published = if completed {
            let url = video_storage_url(&self.video_base_url, reservation_id);
            self.videos.publish_if_absent(&mut *tx, reservation_id, &url, now).await?
        } else {
            false
        };

        tx.commit().await?;
        Ok((completed, published))
    }

    /// Runs `run_once` on a fixed period until the task is aborted.
    pub fn spawn(self, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once(Utc::now()).await {
                    tracing::error!("Completion sweep failed: {}", e);
                }
            }
        })
    }

    pub async fn list_my_videos(&self, user_id: i64) -> Result<Vec<MatchVideo>, AppError> {
        self.videos.list_for_user(user_id).await
    }
}
