//! Actuals error types.

use thiserror::Error;

use budgetrack_shared::{
    AppError,
    types::{ActualId, LineItemId},
};

use crate::currency::CurrencyError;

/// Actuals-related errors.
#[derive(Debug, Error)]
pub enum ActualsError {
    /// Actual not found.
    #[error("Actual not found: {0}")]
    ActualNotFound(ActualId),

    /// Line item not found.
    #[error("Line item not found: {0}")]
    LineItemNotFound(LineItemId),

    /// Actual has no invoice date to derive a month from.
    #[error("Actual {0} has no invoice date")]
    MissingInvoiceDate(ActualId),

    /// No line item supplied.
    #[error("lineItemId is required")]
    MissingLineItem,

    /// Uploaded sheet lacks a required column.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Uploaded file could not be read as CSV.
    #[error("Invalid file: {0}")]
    InvalidFile(String),

    /// Currency lookup failed for a reason other than a missing rate.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl ActualsError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<ActualsError> for AppError {
    fn from(err: ActualsError) -> Self {
        match err {
            ActualsError::ActualNotFound(_) | ActualsError::LineItemNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            ActualsError::MissingInvoiceDate(_)
            | ActualsError::MissingLineItem
            | ActualsError::MissingColumn(_)
            | ActualsError::InvalidFile(_) => Self::Validation(err.to_string()),
            ActualsError::Currency(inner) => inner.into(),
            ActualsError::Repository(msg) => Self::Database(msg),
        }
    }
}
