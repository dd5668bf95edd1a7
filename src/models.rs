// src/models.rs

pub mod catalog;
pub mod ledger;
pub mod membership;
pub mod reservation;
