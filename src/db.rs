// src/db.rs

pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod slot_repo;
pub use slot_repo::SlotRepository;
pub mod pricing_repo;
pub use pricing_repo::PricingRepository;
pub mod membership_repo;
pub use membership_repo::MembershipRepository;
pub mod reservation_repo;
pub use reservation_repo::{NewReservation, ReservationRepository};
pub mod ledger_repo;
pub use ledger_repo::LedgerRepository;
pub mod video_repo;
pub use video_repo::VideoRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;

// Embedded so the binary and the integration tests run the same schema
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
