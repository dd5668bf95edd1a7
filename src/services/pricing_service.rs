// src/services/pricing_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::PricingRepository,
    models::catalog::{BasePrice, PriceQuote, PricingRule},
    services::{
        audit::{AuditEvent, AuditLog},
        catalog_service::CatalogService,
        slot_service::{SlotService, DEFAULT_SLOT_MINUTES},
    },
};

/// How many base slots `total_minutes` spans. Must be a positive whole number.
pub fn duration_multiplier(total_minutes: i32, base_minutes: i32) -> Result<i32, AppError> {
    if base_minutes <= 0 {
        return Err(AppError::InvalidDuration(format!(
            "base slot of {} minutes",
            base_minutes
        )));
    }
    if total_minutes <= 0 {
        return Err(AppError::InvalidDuration(format!(
            "{} minutes is not positive",
            total_minutes
        )));
    }
    if total_minutes % base_minutes != 0 {
        return Err(AppError::InvalidDuration(format!(
            "{} minutes is not a multiple of {}",
            total_minutes, base_minutes
        )));
    }
    Ok(total_minutes / base_minutes)
}

pub fn total_price(base_price: Decimal, multiplier: i32) -> Decimal {
    (base_price * Decimal::from(multiplier)).round_dp(2)
}

#[derive(Clone)]
pub struct PricingService {
    catalog: CatalogService,
    slots: SlotService,
    repo: PricingRepository,
    audit: AuditLog,
    pool: PgPool,
    default_currency: String,
}

impl PricingService {
    pub fn new(
        catalog: CatalogService,
        slots: SlotService,
        repo: PricingRepository,
        audit: AuditLog,
        pool: PgPool,
        default_currency: String,
    ) -> Self {
        Self { catalog, slots, repo, audit, pool, default_currency }
    }

    pub async fn get_base_price(&self, pitch_id: i64, base_minutes: i32) -> Result<BasePrice, AppError> {
        let option = self
            .repo
            .find_duration_option(&self.pool, base_minutes)
            .await?
            .ok_or(AppError::PricingNotConfigured(base_minutes))?;

        let rule = self
            .repo
            .find_active_rule(&self.pool, pitch_id, option.id)
            .await?
            .ok_or(AppError::PricingNotConfigured(base_minutes))?;

        Ok(BasePrice { price: rule.price, currency: rule.currency })
    }

    pub async fn upsert(
        &self,
        owner_id: i64,
        pitch_id: i64,
        duration_minutes: i32,
        price: Decimal,
        currency: Option<String>,
    ) -> Result<PricingRule, AppError> {
        self.catalog.owned_pitch(owner_id, pitch_id).await?;

        let currency = currency
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| self.default_currency.clone());
        let price = price.round_dp(2);

        let mut tx = self.pool.begin().await?;

        let option = self
            .repo
            .find_duration_option(&mut *tx, duration_minutes)
            .await?
            .ok_or_else(|| {
                AppError::InvalidDuration(format!("{} minutes is not an offered duration", duration_minutes))
            })?;

        let rule = match self.repo.lock_latest_rule_id(&mut *tx, pitch_id, option.id).await? {
            Some(rule_id) => self.repo.reactivate_rule(&mut *tx, rule_id, price, &currency).await?,
            None => {
                self.repo
                    .insert_rule(&mut *tx, pitch_id, option.id, price, &currency)
                    .await?
            }
        };

        tx.commit().await?;

        tracing::info!("Pitch {} price for {} min set to {} {}", pitch_id, duration_minutes, price, currency);
        self.audit.emit(AuditEvent::new(
            owner_id,
            "PRICING_UPSERT",
            "PricingRule",
            rule.id,
            format!("pitch={} minutes={} price={} {}", pitch_id, duration_minutes, price, currency),
        ));

        Ok(rule)
    }

    pub async fn list_for_owner(&self, owner_id: i64, pitch_id: i64) -> Result<Vec<PricingRule>, AppError> {
        self.catalog.owned_pitch(owner_id, pitch_id).await?;
        self.repo.list_for_pitch(pitch_id).await
    }

    /// Public price preview. The base is the duration of the facility's first bookable slot.
    pub async fn quote(&self, pitch_id: i64, total_minutes: Option<i32>) -> Result<PriceQuote, AppError> {
        let (pitch, facility) = self.catalog.pitch(pitch_id).await?;

        let base_minutes = self
            .slots
            .bookable_slots(facility.id)
            .await?
            .first()
            .map(|s| s.duration_minutes)
            .unwrap_or(DEFAULT_SLOT_MINUTES);

        let total_minutes = total_minutes.unwrap_or(base_minutes);
        let multiplier = duration_multiplier(total_minutes, base_minutes)?;
        let base = self.get_base_price(pitch.id, base_minutes).await?;

        Ok(PriceQuote {
            pitch_id: pitch.id,
            base_minutes,
            base_price: base.price,
            currency: base.currency,
            total_minutes,
            total_price: total_price(base.price, multiplier),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn money(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn whole_multiples_are_accepted() {
        assert_eq!(duration_multiplier(60, 60).unwrap(), 1);
        assert_eq!(duration_multiplier(120, 60).unwrap(), 2);
        assert_eq!(duration_multiplier(180, 60).unwrap(), 3);
    }

    #[test]
    fn partial_or_non_positive_durations_are_rejected() {
        for minutes in [30, 90, 61, 0, -60] {
            assert!(
                matches!(duration_multiplier(minutes, 60), Err(AppError::InvalidDuration(_))),
                "{} should be rejected",
                minutes
            );
        }
    }

    #[test]
    fn total_is_base_times_multiplier() {
        assert_eq!(total_price(money("100.00"), 3), money("300.00"));
        assert_eq!(total_price(money("45.50"), 2), money("91.00"));
    }

    proptest! {
        #[test]
        fn multiplier_accepts_exactly_the_multiples(base in 1i32..240, total in -500i32..3000) {
            let result = duration_multiplier(total, base);
            if total > 0 && total % base == 0 {
                prop_assert_eq!(result.unwrap() * base, total);
            } else {
                prop_assert!(result.is_err());
            }
        }
    }
}
