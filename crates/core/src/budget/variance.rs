//! Budget variance calculations.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use budgetrack_shared::types::LineItemId;

use super::error::BudgetError;
use super::store::LineItemStore;
use crate::actuals::Actual;

/// Variance status for an expense line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceStatus {
    /// Spent less than budgeted.
    Favorable,
    /// Spent more than budgeted.
    Unfavorable,
    /// Spent exactly the budget.
    OnBudget,
}

/// Budget vs actuals for one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VarianceReport {
    /// Line item the report belongs to.
    pub line_item_id: LineItemId,
    /// Stored total budget.
    pub total_budget: Decimal,
    /// Sum of applied actuals.
    pub total_actuals: Decimal,
    /// `total_budget - total_actuals`.
    pub variance: Decimal,
    /// Variance as a percentage of the budget, 2 dp.
    pub variance_percentage: Decimal,
    /// Classification of the variance.
    pub status: VarianceStatus,
}

impl VarianceReport {
    /// Computes the variance of `actuals` against `total_budget`.
    #[must_use]
    pub fn compute(line_item_id: LineItemId, total_budget: Decimal, actuals: &[Actual]) -> Self {
        let total_actuals: Decimal = actuals.iter().map(actual_value).sum();
        let variance = total_budget - total_actuals;

        let variance_percentage = if total_budget.is_zero() {
            Decimal::ZERO
        } else {
            (variance / total_budget * Decimal::ONE_HUNDRED).round_dp(2)
        };

        let status = match variance.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Greater => VarianceStatus::Favorable,
            std::cmp::Ordering::Less => VarianceStatus::Unfavorable,
            std::cmp::Ordering::Equal => VarianceStatus::OnBudget,
        };

        Self {
            line_item_id,
            total_budget,
            total_actuals,
            variance,
            variance_percentage,
            status,
        }
    }
}

/// Value an actual contributes: converted amount when present, else the raw amount.
#[must_use]
pub fn actual_value(actual: &Actual) -> Decimal {
    actual.converted_amount.unwrap_or(actual.amount)
}

/// Computes variance reports from stored data.
pub struct VarianceCalculator<S: LineItemStore> {
    store: Arc<S>,
}

impl<S: LineItemStore> VarianceCalculator<S> {
    /// Creates a new calculator.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the variance report for a line item.
    pub async fn variance(&self, line_item_id: LineItemId) -> Result<VarianceReport, BudgetError> {
        let line_item = self
            .store
            .find_line_item(line_item_id)
            .await?
            .ok_or(BudgetError::LineItemNotFound(line_item_id))?;

        let actuals = self.store.list_applied_actuals(line_item_id).await?;

        Ok(VarianceReport::compute(
            line_item_id,
            line_item.total_budget,
            &actuals,
        ))
    }
}
