//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Most of them implement the storage traits declared in `budgetrack_core`.

pub mod actual;
pub mod audit_log;
pub mod currency_rate;
pub mod line_item;
pub mod master_data;
pub mod purchase_order;

pub use actual::ActualRepository;
pub use audit_log::AuditLogRepository;
pub use currency_rate::CurrencyRateRepository;
pub use line_item::LineItemRepository;
pub use master_data::MasterDataRepository;
pub use purchase_order::PurchaseOrderRepository;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{DbErr, SqlErr};

/// Returns true if the error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Current time in the column representation.
pub(crate) fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}
