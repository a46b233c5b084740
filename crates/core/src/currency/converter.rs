//! Point-in-time currency conversion.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use budgetrack_shared::types::{CurrencyCode, checked_convert};

use super::error::CurrencyError;
use super::exchange::ExchangeRate;
use super::store::RateStore;

/// Result of a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    /// Input amount.
    pub amount: Decimal,
    /// Source currency.
    pub from: CurrencyCode,
    /// Target currency.
    pub to: CurrencyCode,
    /// Rate applied (1 for same-currency conversions).
    pub rate: Decimal,
    /// Effective date of the rate row used, if any.
    pub rate_date: Option<NaiveDate>,
    /// `amount * rate`.
    pub converted_amount: Decimal,
}

/// Converts amounts using stored exchange rates.
pub struct CurrencyConverter<R: RateStore> {
    store: Arc<R>,
}

impl<R: RateStore> Clone for CurrencyConverter<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<R: RateStore> CurrencyConverter<R> {
    /// Creates a new converter.
    pub fn new(store: Arc<R>) -> Self {
        Self { store }
    }

    /// Converts `amount` from one currency to another as of `as_of` (today when absent).
    ///
    /// Same-currency conversions never consult the rate table.
    pub async fn convert(
        &self,
        amount: Decimal,
        from: &CurrencyCode,
        to: &CurrencyCode,
        as_of: Option<NaiveDate>,
    ) -> Result<Conversion, CurrencyError> {
        if from == to {
            return Ok(Conversion {
                amount,
                from: from.clone(),
                to: to.clone(),
                rate: Decimal::ONE,
                rate_date: None,
                converted_amount: amount,
            });
        }

        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        let rate = self
            .store
            .latest_rate(from, to, as_of)
            .await?
            .ok_or_else(|| CurrencyError::RateNotFound {
                from: from.clone(),
                to: to.clone(),
                date: as_of,
            })?;

        debug!(%from, %to, %as_of, rate = %rate.rate, "Resolved exchange rate");

        let converted_amount = checked_convert(amount, rate.rate).ok_or(
            CurrencyError::ConversionOutOfRange {
                amount,
                rate: rate.rate,
            },
        )?;

        Ok(Conversion {
            amount,
            from: from.clone(),
            to: to.clone(),
            rate: rate.rate,
            rate_date: Some(rate.effective_date),
            converted_amount,
        })
    }

    /// Validates and stores a rate.
    pub async fn upsert_rate(&self, rate: ExchangeRate) -> Result<ExchangeRate, CurrencyError> {
        rate.validate()?;
        let saved = self.store.upsert_rate(rate).await?;
        info!(
            from = %saved.from_currency,
            to = %saved.to_currency,
            date = %saved.effective_date,
            rate = %saved.rate,
            "Exchange rate saved"
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;
    use rust_decimal_macros::dec;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn converter_with_rates(rates: &[(&str, &str, NaiveDate, Decimal)]) -> CurrencyConverter<InMemoryStore> {
        let store = InMemoryStore::default();
        for (from, to, day, rate) in rates {
            store.add_rate(ExchangeRate::new(code(from), code(to), *rate, *day));
        }
        CurrencyConverter::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_same_currency_is_identity_even_with_rate_rows() {
        let converter = converter_with_rates(&[("USD", "USD", date(2025, 1, 1), dec!(2))]);

        let result = converter
            .convert(dec!(125.50), &code("usd"), &code("USD"), Some(date(2025, 6, 1)))
            .await
            .unwrap();

        assert_eq!(result.converted_amount, dec!(125.50));
        assert_eq!(result.rate, Decimal::ONE);
        assert!(result.rate_date.is_none());
    }

    #[tokio::test]
    async fn test_picks_latest_rate_not_after_reference_date() {
        let converter = converter_with_rates(&[
            ("USD", "INR", date(2025, 1, 1), dec!(82)),
            ("USD", "INR", date(2025, 3, 1), dec!(83)),
            ("USD", "INR", date(2025, 5, 1), dec!(84)),
        ]);

        let result = converter
            .convert(dec!(10), &code("USD"), &code("INR"), Some(date(2025, 4, 15)))
            .await
            .unwrap();

        assert_eq!(result.rate, dec!(83));
        assert_eq!(result.rate_date, Some(date(2025, 3, 1)));
        assert_eq!(result.converted_amount, dec!(830));
    }

    #[tokio::test]
    async fn test_rate_effective_on_reference_date_is_used() {
        let converter = converter_with_rates(&[("EUR", "INR", date(2025, 4, 1), dec!(90.5))]);

        let result = converter
            .convert(dec!(2), &code("EUR"), &code("INR"), Some(date(2025, 4, 1)))
            .await
            .unwrap();

        assert_eq!(result.converted_amount, dec!(181.0));
    }

    #[tokio::test]
    async fn test_missing_rate_is_an_error() {
        let converter = converter_with_rates(&[("USD", "INR", date(2025, 5, 1), dec!(84))]);

        let err = converter
            .convert(dec!(10), &code("USD"), &code("INR"), Some(date(2025, 4, 1)))
            .await
            .unwrap_err();

        assert!(matches!(err, CurrencyError::RateNotFound { .. }));
    }

    #[tokio::test]
    async fn test_overflowing_conversion_is_an_error() {
        let converter = converter_with_rates(&[("USD", "INR", date(2025, 1, 1), dec!(83))]);

        let err = converter
            .convert(Decimal::MAX, &code("USD"), &code("INR"), Some(date(2025, 4, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, CurrencyError::ConversionOutOfRange { rate, .. } if rate == dec!(83)));

        let err = converter
            .convert(dec!(100000000000000), &code("USD"), &code("INR"), Some(date(2025, 4, 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, CurrencyError::ConversionOutOfRange { .. }));
    }

    #[tokio::test]
    async fn test_inverse_pair_is_not_used() {
        let converter = converter_with_rates(&[("INR", "USD", date(2025, 1, 1), dec!(0.012))]);

        let err = converter
            .convert(dec!(10), &code("USD"), &code("INR"), Some(date(2025, 4, 1)))
            .await
            .unwrap_err();

        assert!(matches!(err, CurrencyError::RateNotFound { .. }));
    }

    #[tokio::test]
    async fn test_upsert_rate_rejects_non_positive_and_same_currency() {
        let converter = converter_with_rates(&[]);

        let zero = ExchangeRate::new(code("USD"), code("INR"), Decimal::ZERO, date(2025, 1, 1));
        assert!(matches!(
            converter.upsert_rate(zero).await,
            Err(CurrencyError::InvalidRate(_))
        ));

        let same = ExchangeRate::new(code("USD"), code("USD"), dec!(1), date(2025, 1, 1));
        assert!(matches!(
            converter.upsert_rate(same).await,
            Err(CurrencyError::SameCurrency(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_rate_replaces_same_day_rate() {
        let converter = converter_with_rates(&[]);
        let day = date(2025, 4, 1);

        converter
            .upsert_rate(ExchangeRate::new(code("USD"), code("INR"), dec!(83), day))
            .await
            .unwrap();
        converter
            .upsert_rate(ExchangeRate::new(code("USD"), code("INR"), dec!(85), day))
            .await
            .unwrap();

        let result = converter
            .convert(dec!(1), &code("USD"), &code("INR"), Some(day))
            .await
            .unwrap();
        assert_eq!(result.rate, dec!(85));
    }
}
