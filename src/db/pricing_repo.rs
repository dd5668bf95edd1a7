// src/db/pricing_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::catalog::{DurationOption, PricingRule},
};

#[derive(Clone)]
pub struct PricingRepository {
    pool: PgPool,
}

// Rules are always returned joined with their option's minutes
const RULE_COLUMNS: &str = r#"
    r.id, r.pitch_id, r.duration_option_id, d.minutes, r.price, r.currency, r.active
"#;

impl PricingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_duration_option<'e, E>(
        &self,
        executor: E,
        minutes: i32,
    ) -> Result<Option<DurationOption>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let option = sqlx::query_as::<_, DurationOption>(
            "SELECT id, minutes, label FROM duration_options WHERE minutes = $1",
        )
        .bind(minutes)
        .fetch_optional(executor)
        .await?;
        Ok(option)
    }

    pub async fn find_active_rule<'e, E>(
        &self,
        executor: E,
        pitch_id: i64,
        duration_option_id: i64,
    ) -> Result<Option<PricingRule>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {RULE_COLUMNS}
            FROM pricing_rules r
            JOIN duration_options d ON d.id = r.duration_option_id
            WHERE r.pitch_id = $1 AND r.duration_option_id = $2 AND r.active
            "#
        );
        let rule = sqlx::query_as::<_, PricingRule>(&sql)
            .bind(pitch_id)
            .bind(duration_option_id)
            .fetch_optional(executor)
            .await?;
        Ok(rule)
    }

    /// The rule to overwrite on upsert: the active one, else the newest inactive one.
    pub async fn lock_latest_rule_id<'e, E>(
        &self,
        executor: E,
        pitch_id: i64,
        duration_option_id: i64,
    ) -> Result<Option<i64>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM pricing_rules
            WHERE pitch_id = $1 AND duration_option_id = $2
            ORDER BY active DESC, id DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(pitch_id)
        .bind(duration_option_id)
        .fetch_optional(executor)
        .await?;
        Ok(id)
    }

    pub async fn reactivate_rule<'e, E>(
        &self,
        executor: E,
        rule_id: i64,
        price: Decimal,
        currency: &str,
    ) -> Result<PricingRule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            WITH r AS (
                UPDATE pricing_rules
                SET price = $2, currency = $3, active = TRUE
                WHERE id = $1
                RETURNING *
            )
            SELECT {RULE_COLUMNS}
            FROM r JOIN duration_options d ON d.id = r.duration_option_id
            "#
        );
        let rule = sqlx::query_as::<_, PricingRule>(&sql)
            .bind(rule_id)
            .bind(price)
            .bind(currency)
            .fetch_one(executor)
            .await?;
        Ok(rule)
    }

    pub async fn insert_rule<'e, E>(
        &self,
        executor: E,
        pitch_id: i64,
        duration_option_id: i64,
        price: Decimal,
        currency: &str,
    ) -> Result<PricingRule, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            WITH r AS (
                INSERT INTO pricing_rules (pitch_id, duration_option_id, price, currency, active)
                VALUES ($1, $2, $3, $4, TRUE)
                RETURNING *
            )
            SELECT {RULE_COLUMNS}
            FROM r JOIN duration_options d ON d.id = r.duration_option_id
            "#
        );
        let rule = sqlx::query_as::<_, PricingRule>(&sql)
            .bind(pitch_id)
            .bind(duration_option_id)
            .bind(price)
            .bind(currency)
            .fetch_one(executor)
            .await?;
        Ok(rule)
    }

    pub async fn list_for_pitch(&self, pitch_id: i64) -> Result<Vec<PricingRule>, AppError> {
        let sql = format!(
            r#"
            SELECT {RULE_COLUMNS}
            FROM pricing_rules r
            JOIN duration_options d ON d.id = r.duration_option_id
            WHERE r.pitch_id = $1
            ORDER BY d.minutes ASC, r.active DESC, r.id DESC
            "#
        );
        let rules = sqlx::query_as::<_, PricingRule>(&sql)
            .bind(pitch_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rules)
    }
}
