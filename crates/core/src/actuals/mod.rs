//! Actual expenditure records: application to line items and spreadsheet import.

pub mod applier;
pub mod error;
pub mod import;
pub mod store;
pub mod types;

pub use applier::ActualsApplier;
pub use error::ActualsError;
pub use import::{
    ActualsImporter, ImportOutcome, ImportReport, ImportRowReport, RawActualRow,
    parse_actuals_csv, parse_invoice_date,
};
pub use store::ActualStore;
pub use types::{Actual, ActualFilter, NewActual};
