//! `SeaORM` entity definitions.

pub mod actuals;
pub mod audit_logs;
pub mod budget_heads;
pub mod currency_rates;
pub mod line_items;
pub mod monthly_allocations;
pub mod po_line_items;
pub mod purchase_orders;
pub mod sea_orm_active_enums;
pub mod towers;
