// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::{i18n::I18nStore, time::FacilityClock},
    db::{
        AuditRepository, CatalogRepository, LedgerRepository, MembershipRepository, PricingRepository,
        ReservationRepository, SlotRepository, VideoRepository,
    },
    services::{
        audit::{AuditLog, PgAuditSink},
        catalog_service::CatalogService,
        completion_service::CompletionService,
        ledger_service::LedgerService,
        membership_service::MembershipService,
        pricing_service::PricingService,
        reservation_service::ReservationService,
        slot_service::SlotService,
    },
};

// =============================================================================
//  SETTINGS
// =============================================================================

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub clock: FacilityClock,
    pub default_currency: String,
    pub reconcile_interval: Duration,
    pub video_base_url: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        // A missing .env is fine, the variables may come from the environment
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: var_or("BIND_ADDR", "0.0.0.0:3000"),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            clock: FacilityClock::parse(&var_or("FACILITY_TIMEZONE", "Europe/Istanbul"))?,
            default_currency: var_or("DEFAULT_CURRENCY", "TRY").to_uppercase(),
            reconcile_interval: Duration::from_secs(parse_var("RECONCILE_INTERVAL_SECS", 60)?),
            video_base_url: var_or("VIDEO_BASE_URL", "https://cdn.ehalisaha.local/videos"),
        })
    }

    /// Defaults for everything but the connection and the secret.
    pub fn with_defaults(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            bind_addr: "0.0.0.0:3000".into(),
            db_max_connections: 5,
            clock: FacilityClock::default(),
            default_currency: "TRY".into(),
            reconcile_interval: Duration::from_secs(60),
            video_base_url: "https://cdn.ehalisaha.local/videos".into(),
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value {:?}: {}", key, raw, e)),
        _ => Ok(default),
    }
}

// =============================================================================
//  APP STATE
// =============================================================================

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Arc<Settings>,
    pub i18n_store: I18nStore,
    pub slot_service: SlotService,
    pub pricing_service: PricingService,
    pub membership_service: MembershipService,
    pub reservation_service: ReservationService,
    pub ledger_service: LedgerService,
    pub completion_service: CompletionService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Could not connect to the database")?;

        tracing::info!("Database connection established");

        Ok(Self::from_pool(db_pool, settings))
    }

    /// Wires every repository and service over an existing pool.
    pub fn from_pool(db_pool: PgPool, settings: Settings) -> Self {
        let pool = db_pool.clone();

        // --- Repositories ---
        let catalog_repo = CatalogRepository::new(pool.clone());
        let slot_repo = SlotRepository::new(pool.clone());
        let pricing_repo = PricingRepository::new(pool.clone());
        let membership_repo = MembershipRepository::new(pool.clone());
        let reservation_repo = ReservationRepository::new(pool.clone());
        let ledger_repo = LedgerRepository::new(pool.clone());
        let video_repo = VideoRepository::new(pool.clone());
        let audit = AuditLog::new(Arc::new(PgAuditSink::new(AuditRepository::new(pool.clone()))));

        // --- Services ---
        let catalog_service = CatalogService::new(catalog_repo.clone(), pool.clone());
        let slot_service = SlotService::new(catalog_service.clone(), slot_repo, audit.clone(), pool.clone());
        let pricing_service = PricingService::new(
            catalog_service.clone(),
            slot_service.clone(),
            pricing_repo,
            audit.clone(),
            pool.clone(),
            settings.default_currency.clone(),
        );
        let membership_service = MembershipService::new(
            catalog_service.clone(),
            catalog_repo,
            membership_repo,
            audit.clone(),
            pool.clone(),
        );
        let reservation_service = ReservationService::new(
            catalog_service.clone(),
            slot_service.clone(),
            pricing_service.clone(),
            membership_service.clone(),
            reservation_repo.clone(),
            audit.clone(),
            settings.clock,
            pool.clone(),
        );
        let ledger_service = LedgerService::new(
            catalog_service,
            slot_service.clone(),
            ledger_repo,
            reservation_repo.clone(),
            audit,
            settings.clock,
            pool.clone(),
        );
        let completion_service =
            CompletionService::new(reservation_repo, video_repo, settings.video_base_url.clone(), pool);

        Self {
            db_pool,
            settings: Arc::new(settings),
            i18n_store: I18nStore::new(),
            slot_service,
            pricing_service,
            membership_service,
            reservation_service,
            ledger_service,
            completion_service,
        }
    }
}
