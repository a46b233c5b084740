//! Currency error types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use budgetrack_shared::{AppError, types::CurrencyCode};

/// Currency-related errors.
#[derive(Debug, Error)]
pub enum CurrencyError {
    /// No rate for the pair on or before the date.
    #[error("No exchange rate from {from} to {to} on or before {date}")]
    RateNotFound {
        /// Source currency.
        from: CurrencyCode,
        /// Target currency.
        to: CurrencyCode,
        /// Reference date.
        date: NaiveDate,
    },

    /// Converted amount overflows or does not fit an amount column.
    #[error("Converting {amount} at rate {rate} exceeds {max}", max = budgetrack_shared::types::MAX_AMOUNT)]
    ConversionOutOfRange {
        /// Input amount.
        amount: Decimal,
        /// Rate applied.
        rate: Decimal,
    },

    /// Rate is zero or negative.
    #[error("Exchange rate must be positive, got {0}")]
    InvalidRate(Decimal),

    /// Rate between a currency and itself.
    #[error("Cannot store a rate from {0} to itself")]
    SameCurrency(CurrencyCode),

    /// Malformed currency code.
    #[error("{0}")]
    InvalidCurrency(String),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl CurrencyError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<CurrencyError> for AppError {
    fn from(err: CurrencyError) -> Self {
        match err {
            CurrencyError::RateNotFound { .. } => Self::ExternalService(err.to_string()),
            CurrencyError::ConversionOutOfRange { .. }
            | CurrencyError::InvalidRate(_)
            | CurrencyError::SameCurrency(_)
            | CurrencyError::InvalidCurrency(_) => Self::Validation(err.to_string()),
            CurrencyError::Repository(msg) => Self::Database(msg),
        }
    }
}
