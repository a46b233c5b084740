//! Exchange rate types and logic.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use budgetrack_shared::types::CurrencyCode;

use super::error::CurrencyError;

/// Exchange rate between two currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    /// Source currency code.
    pub from_currency: CurrencyCode,
    /// Target currency code.
    pub to_currency: CurrencyCode,
    /// Exchange rate (1 from_currency = rate to_currency).
    pub rate: Decimal,
    /// Date this rate is effective.
    pub effective_date: NaiveDate,
}

impl ExchangeRate {
    /// Creates a new exchange rate.
    #[must_use]
    pub const fn new(
        from_currency: CurrencyCode,
        to_currency: CurrencyCode,
        rate: Decimal,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            from_currency,
            to_currency,
            rate,
            effective_date,
        }
    }

    /// Checks that the rate is positive and the currencies differ.
    ///
    /// # Errors
    ///
    /// Returns `CurrencyError::InvalidRate` or `CurrencyError::SameCurrency`.
    pub fn validate(&self) -> Result<(), CurrencyError> {
        if self.rate <= Decimal::ZERO {
            return Err(CurrencyError::InvalidRate(self.rate));
        }
        if self.from_currency == self.to_currency {
            return Err(CurrencyError::SameCurrency(self.from_currency.clone()));
        }
        Ok(())
    }

    /// Returns true if this rate may be used on `date`.
    #[must_use]
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        self.effective_date <= date
    }
}

/// Picks the rate with the latest effective date on or before `as_of`.
///
/// Only rates for the exact `from -> to` pair are considered.
#[must_use]
pub fn select_latest<'a>(
    rates: impl IntoIterator<Item = &'a ExchangeRate>,
    from: &CurrencyCode,
    to: &CurrencyCode,
    as_of: NaiveDate,
) -> Option<&'a ExchangeRate> {
    rates
        .into_iter()
        .filter(|r| &r.from_currency == from && &r.to_currency == to)
        .filter(|r| r.is_effective_on(as_of))
        .max_by_key(|r| r.effective_date)
}

#[cfg(test)]
#[path = "exchange_tests.rs"]
mod tests;
