//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{
    CurrencyCode, LAC, MAX_AMOUNT, MAX_RATE, checked_convert, storable_amount, storable_rate, to_lac,
};
pub use pagination::{PageRequest, PageResponse};
