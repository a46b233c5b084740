//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` everywhere; currencies are ISO 4217 codes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One lakh (lac) of the common currency.
pub const LAC: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Largest magnitude an amount column (`NUMERIC(19, 4)`) can hold.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_313_682_943, 2_328_306_436, 0, false, 4);

/// Largest magnitude a rate column (`NUMERIC(19, 10)`) can hold.
pub const MAX_RATE: Decimal = Decimal::from_parts(2_313_682_943, 2_328_306_436, 0, false, 10);

/// Returns the amount if it fits an amount column once rounded to 4 places.
#[must_use]
pub fn storable_amount(amount: Decimal) -> Option<Decimal> {
    (amount.round_dp(4).abs() <= MAX_AMOUNT).then_some(amount)
}

/// Returns the rate if it fits a rate column once rounded to 10 places.
#[must_use]
pub fn storable_rate(rate: Decimal) -> Option<Decimal> {
    (rate.round_dp(10).abs() <= MAX_RATE).then_some(rate)
}

/// Multiplies an amount by a rate, returning `None` when the product
/// overflows or does not fit an amount column.
#[must_use]
pub fn checked_convert(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    amount.checked_mul(rate).and_then(storable_amount)
}

/// Expresses an amount in lakhs.
#[must_use]
pub fn to_lac(amount: Decimal) -> Decimal {
    (amount / LAC).normalize()
}

/// ISO 4217 currency code (three ASCII letters, stored upper-case).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parses and normalizes a currency code.
    ///
    /// # Errors
    ///
    /// Returns a message if the code is not exactly three ASCII letters.
    pub fn parse(code: &str) -> Result<Self, String> {
        let trimmed = code.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(format!("Invalid currency code: {code}"))
        }
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
