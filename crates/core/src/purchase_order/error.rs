//! Purchase order error types.

use thiserror::Error;

use budgetrack_shared::{
    AppError,
    types::{LineItemId, PurchaseOrderId},
};

/// Purchase order errors.
#[derive(Debug, Error)]
pub enum PurchaseOrderError {
    /// PO not found.
    #[error("Purchase order not found: {0}")]
    NotFound(PurchaseOrderId),

    /// PO number already taken.
    #[error("Purchase order number already exists: {0}")]
    DuplicatePoNumber(String),

    /// Same line item linked twice.
    #[error("Line item {0} is linked more than once")]
    DuplicateLineItem(LineItemId),

    /// Linked line items do not exist.
    #[error("Unknown line items: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    UnknownLineItems(Vec<LineItemId>),

    /// Other invalid input.
    #[error("{0}")]
    Validation(String),

    /// Audit payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl PurchaseOrderError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }
}

impl From<PurchaseOrderError> for AppError {
    fn from(err: PurchaseOrderError) -> Self {
        match err {
            PurchaseOrderError::NotFound(_) => Self::NotFound(err.to_string()),
            PurchaseOrderError::DuplicatePoNumber(_) => Self::Conflict(err.to_string()),
            PurchaseOrderError::DuplicateLineItem(_)
            | PurchaseOrderError::UnknownLineItems(_)
            | PurchaseOrderError::Validation(_) => Self::Validation(err.to_string()),
            PurchaseOrderError::Serialization(msg) => Self::Internal(msg),
            PurchaseOrderError::Repository(msg) => Self::Database(msg),
        }
    }
}
