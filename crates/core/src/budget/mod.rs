//! Budget line items, monthly allocations and variance analysis.

pub mod aggregator;
pub mod error;
pub mod store;
pub mod types;
pub mod variance;


pub use aggregator::{MonthlyBudgetAggregator, lenient_amount, parse_monthly_data, sum_allocations};
pub use error::BudgetError;
pub use store::LineItemStore;
pub use types::{
    BudgetHead, LineItem, LineItemDetail, LineItemFilter, MonthlyAllocation, NewBudgetHead, NewLineItem, NewTower,
    Tower,
};
pub use variance::{VarianceCalculator, VarianceReport, VarianceStatus, actual_value};
