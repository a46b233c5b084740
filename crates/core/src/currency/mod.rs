//! Currency rate lookup and conversion.

pub mod converter;
pub mod error;
pub mod exchange;
pub mod store;

pub use converter::{Conversion, CurrencyConverter};
pub use error::CurrencyError;
pub use exchange::{ExchangeRate, select_latest};
pub use store::RateStore;
