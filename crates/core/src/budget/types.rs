//! Budget data types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use budgetrack_shared::types::{BudgetHeadId, LineItemId, TowerId};

use super::error::BudgetError;
use crate::actuals::Actual;
use crate::fiscal::{FiscalYear, Month};

/// Top-level cost classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tower {
    /// Tower ID.
    pub id: TowerId,
    /// Short unique code.
    pub code: String,
    /// Display name.
    pub name: String,
}

/// Budget head (expense category), optionally scoped to a tower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetHead {
    /// Budget head ID.
    pub id: BudgetHeadId,
    /// Short unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Owning tower, if any.
    pub tower_id: Option<TowerId>,
}

/// A budgeted expense entry for one fiscal year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Line item ID.
    pub id: LineItemId,
    /// Business-facing unique identifier.
    pub uid: String,
    /// Free-text description.
    pub description: String,
    /// Fiscal year the budget belongs to.
    pub fiscal_year: FiscalYear,
    /// Owning tower.
    pub tower_id: TowerId,
    /// Owning budget head.
    pub budget_head_id: BudgetHeadId,
    /// Sum of the monthly allocations.
    pub total_budget: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Budgeted amount for one month of a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyAllocation {
    /// Line item the allocation belongs to.
    pub line_item_id: LineItemId,
    /// Month label.
    pub month: Month,
    /// Amount; a missing amount counts as zero.
    pub amount: Option<Decimal>,
}

/// Line item with its classification names, allocations and actuals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDetail {
    /// The line item.
    #[serde(flatten)]
    pub line_item: LineItem,
    /// Tower name.
    pub tower_name: String,
    /// Budget head name.
    pub budget_head_name: String,
    /// Monthly allocations in fiscal order.
    pub allocations: Vec<MonthlyAllocation>,
    /// Actuals applied to this line item.
    pub actuals: Vec<Actual>,
}

/// Input for creating a line item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    /// Business-facing unique identifier.
    pub uid: String,
    /// Free-text description.
    pub description: String,
    /// Fiscal year.
    pub fiscal_year: FiscalYear,
    /// Owning tower.
    pub tower_id: TowerId,
    /// Owning budget head.
    pub budget_head_id: BudgetHeadId,
}

impl NewLineItem {
    /// Checks required fields.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::Validation` if the uid or description is blank.
    pub fn validate(&self) -> Result<(), BudgetError> {
        if self.uid.trim().is_empty() {
            return Err(BudgetError::Validation("uid is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(BudgetError::Validation(
                "description is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Filters for listing line items.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemFilter {
    /// Only this fiscal year.
    pub fiscal_year: Option<FiscalYear>,
    /// Only this tower.
    pub tower_id: Option<TowerId>,
    /// Only this budget head.
    pub budget_head_id: Option<BudgetHeadId>,
}

/// Input for creating a tower.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTower {
    /// Short unique code.
    pub code: String,
    /// Display name.
    pub name: String,
}

/// Input for creating a budget head.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudgetHead {
    /// Short unique code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Owning tower, if any.
    pub tower_id: Option<TowerId>,
}

/// Validates a master-data code/name pair.
///
/// # Errors
///
/// Returns `BudgetError::Validation` if either value is blank.
pub fn validate_code_and_name(code: &str, name: &str) -> Result<(), BudgetError> {
    if code.trim().is_empty() {
        return Err(BudgetError::Validation("code is required".to_string()));
    }
    if name.trim().is_empty() {
        return Err(BudgetError::Validation("name is required".to_string()));
    }
    Ok(())
}
