//! Budget error types.

use thiserror::Error;

use budgetrack_shared::{
    AppError,
    types::{BudgetHeadId, LineItemId, TowerId},
};

/// Budget-related errors.
#[derive(Debug, Error)]
pub enum BudgetError {
    /// Line item not found.
    #[error("Line item not found: {0}")]
    LineItemNotFound(LineItemId),

    /// Month label not recognised.
    #[error("Unknown month: {0}")]
    UnknownMonth(String),

    /// Monthly amount is negative.
    #[error("Amount for {0} cannot be negative")]
    NegativeAmount(String),

    /// Monthly amount does not fit an amount column.
    #[error("Amount for {0} exceeds {max}", max = budgetrack_shared::types::MAX_AMOUNT)]
    AmountOutOfRange(String),

    /// Sum of the allocations does not fit an amount column.
    #[error("Total budget exceeds {max}", max = budgetrack_shared::types::MAX_AMOUNT)]
    TotalOutOfRange,

    /// Referenced tower does not exist.
    #[error("Tower not found: {0}")]
    TowerNotFound(TowerId),

    /// Referenced budget head does not exist.
    #[error("Budget head not found: {0}")]
    BudgetHeadNotFound(BudgetHeadId),

    /// Master data code already exists.
    #[error("Code already exists: {0}")]
    DuplicateCode(String),

    /// Line item uid already exists.
    #[error("Line item uid already exists: {0}")]
    DuplicateUid(String),

    /// Other invalid input.
    #[error("{0}")]
    Validation(String),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl BudgetError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<BudgetError> for AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::LineItemNotFound(_) => Self::NotFound(err.to_string()),
            BudgetError::UnknownMonth(_)
            | BudgetError::NegativeAmount(_)
            | BudgetError::AmountOutOfRange(_)
            | BudgetError::TotalOutOfRange
            | BudgetError::TowerNotFound(_)
            | BudgetError::BudgetHeadNotFound(_)
            | BudgetError::Validation(_) => Self::Validation(err.to_string()),
            BudgetError::DuplicateUid(_) | BudgetError::DuplicateCode(_) => {
                Self::Conflict(err.to_string())
            }
            BudgetError::Repository(msg) => Self::Database(msg),
        }
    }
}
