//! Core business logic for Budgetrack.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Services receive storage traits at construction; the db crate implements them.
//!
//! # Modules
//!
//! - `fiscal` - Fiscal years (April to March) and month labels
//! - `budget` - Line items, monthly aggregation and variance
//! - `actuals` - Actual expenditure application and import
//! - `currency` - Point-in-time exchange rates
//! - `purchase_order` - PO lifecycle with audit trail
//! - `spreadsheet` - CSV import/export adapters
//! - `ratelimit` - Per-client request throttling

pub mod actuals;
pub mod audit;
pub mod budget;
pub mod currency;
pub mod fiscal;
pub mod purchase_order;
pub mod ratelimit;
pub mod spreadsheet;

#[cfg(test)]
mod testing;
