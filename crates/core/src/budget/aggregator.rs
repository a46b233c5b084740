//! Monthly budget aggregation.
//!
//! A line item's `total_budget` is always the sum of its monthly allocations.
//! Every write path goes through [`MonthlyBudgetAggregator`]; the store
//! recomputes the total in the same transaction that changes the allocations.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::{debug, info};

use budgetrack_shared::types::{LineItemId, storable_amount};

use super::error::BudgetError;
use super::store::LineItemStore;
use super::types::MonthlyAllocation;
use crate::fiscal::Month;

/// Sums allocation amounts; a missing amount counts as zero.
///
/// # Errors
///
/// Returns `BudgetError::TotalOutOfRange` when the sum does not fit an amount column.
pub fn sum_allocations(allocations: &[MonthlyAllocation]) -> Result<Decimal, BudgetError> {
    allocations
        .iter()
        .try_fold(Decimal::ZERO, |total, a| {
            total.checked_add(a.amount.unwrap_or(Decimal::ZERO))
        })
        .and_then(storable_amount)
        .ok_or(BudgetError::TotalOutOfRange)
}

/// Reads a monthly amount from loosely typed JSON.
///
/// Numbers and numeric strings (thousands separators allowed) are parsed;
/// anything else yields zero.
#[must_use]
pub fn lenient_amount(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .unwrap_or(Decimal::ZERO)
        }
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            Decimal::from_str(&cleaned).unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    }
}

/// Parses a `{month label -> amount}` object.
///
/// # Errors
///
/// Returns `BudgetError::UnknownMonth` for a key that is not a month label.
pub fn parse_monthly_data(data: &Map<String, Value>) -> Result<Vec<(Month, Decimal)>, BudgetError> {
    data.iter()
        .map(|(key, value)| {
            let month = Month::parse(key).ok_or_else(|| BudgetError::UnknownMonth(key.clone()))?;
            Ok((month, lenient_amount(value)))
        })
        .collect()
}

/// Keeps line item totals in sync with their monthly allocations.
pub struct MonthlyBudgetAggregator<S: LineItemStore> {
    store: Arc<S>,
}

impl<S: LineItemStore> MonthlyBudgetAggregator<S> {
    /// Creates a new aggregator.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Recomputes and persists the total budget of a line item.
    pub async fn recalculate_total(&self, line_item_id: LineItemId) -> Result<Decimal, BudgetError> {
        self.ensure_exists(line_item_id).await?;

        let total = self.store.refresh_total(line_item_id).await?;

        info!(%line_item_id, %total, "Recalculated total budget");
        Ok(total)
    }

    /// Upserts monthly allocations and returns the new total.
    ///
    /// A month listed twice keeps its last amount.
    pub async fn upsert_months(
        &self,
        line_item_id: LineItemId,
        entries: Vec<(Month, Decimal)>,
    ) -> Result<Decimal, BudgetError> {
        let mut by_month = BTreeMap::new();
        for (month, amount) in entries {
            if amount < Decimal::ZERO {
                return Err(BudgetError::NegativeAmount(month.label().to_string()));
            }
            if storable_amount(amount).is_none() {
                return Err(BudgetError::AmountOutOfRange(month.label().to_string()));
            }
            by_month.insert(month, amount);
        }

        self.ensure_exists(line_item_id).await?;

        let entries: Vec<(Month, Decimal)> = by_month.into_iter().collect();
        debug!(%line_item_id, months = entries.len(), "Upserting monthly allocations");
        let total = self.store.upsert_allocations(line_item_id, &entries).await?;

        info!(%line_item_id, %total, months = entries.len(), "Monthly allocations saved");
        Ok(total)
    }

    /// Upserts allocations from a raw `monthlyData` object.
    pub async fn upsert_monthly_data(
        &self,
        line_item_id: LineItemId,
        data: &Map<String, Value>,
    ) -> Result<Decimal, BudgetError> {
        let entries = parse_monthly_data(data)?;
        self.upsert_months(line_item_id, entries).await
    }

    async fn ensure_exists(&self, line_item_id: LineItemId) -> Result<(), BudgetError> {
        match self.store.find_line_item(line_item_id).await? {
            Some(_) => Ok(()),
            None => Err(BudgetError::LineItemNotFound(line_item_id)),
        }
    }
}
