//! Storage capabilities needed by currency lookup.

use std::future::Future;

use chrono::NaiveDate;

use budgetrack_shared::types::CurrencyCode;

use super::error::CurrencyError;
use super::exchange::ExchangeRate;

/// Repository trait for exchange rates.
pub trait RateStore: Send + Sync {
    /// Latest rate for the exact pair with `effective_date <= as_of`.
    fn latest_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        as_of: NaiveDate,
    ) -> impl Future<Output = Result<Option<ExchangeRate>, CurrencyError>> + Send;

    /// Insert a rate, or update the row with the same pair and date.
    fn upsert_rate(
        &self,
        rate: ExchangeRate,
    ) -> impl Future<Output = Result<ExchangeRate, CurrencyError>> + Send;
}
