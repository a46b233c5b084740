//! Fiscal year and month handling.

pub mod period;

pub use period::{FiscalYear, Month};
