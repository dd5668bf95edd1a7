// src/services.rs

pub mod audit;
pub mod catalog_service;
pub mod completion_service;
pub mod ledger_service;
pub mod membership_service;
pub mod pricing_service;
pub mod reservation_service;
pub mod slot_service;
