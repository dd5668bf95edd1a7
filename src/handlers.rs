// src/handlers.rs

pub mod ledger;
pub mod memberships;
pub mod pricing;
pub mod reservations;
pub mod slots;
pub mod videos;
