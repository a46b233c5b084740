//! Actuals data types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use budgetrack_shared::types::{ActualId, CurrencyCode, LineItemId};

use crate::fiscal::Month;

/// A recorded real expenditure (invoice).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actual {
    /// Actual ID.
    pub id: ActualId,
    /// Vendor invoice number.
    pub invoice_no: String,
    /// Invoice date; legacy rows may lack one.
    pub invoice_date: Option<NaiveDate>,
    /// Vendor name.
    pub vendor: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Amount in `currency`.
    pub amount: Decimal,
    /// Invoice currency.
    pub currency: CurrencyCode,
    /// Amount in the common currency, when converted.
    pub converted_amount: Option<Decimal>,
    /// Month label derived from the invoice date.
    pub month: Option<Month>,
    /// Line item this actual is applied to.
    pub line_item_id: Option<LineItemId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A validated actual ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActual {
    /// Vendor invoice number.
    pub invoice_no: String,
    /// Invoice date.
    pub invoice_date: NaiveDate,
    /// Vendor name.
    pub vendor: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Amount in `currency`.
    pub amount: Decimal,
    /// Invoice currency.
    pub currency: CurrencyCode,
    /// Amount in the common currency, when converted.
    pub converted_amount: Option<Decimal>,
    /// Month label derived from the invoice date.
    pub month: Month,
}

/// Filters for listing actuals.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualFilter {
    /// Only actuals applied to this line item.
    pub line_item_id: Option<LineItemId>,
    /// Only actuals in this month.
    pub month: Option<Month>,
    /// Only actuals not yet applied to a line item.
    #[serde(default)]
    pub unapplied_only: bool,
}

impl ActualFilter {
    /// Returns true if `actual` passes the filter.
    #[must_use]
    pub fn matches(&self, actual: &Actual) -> bool {
        if self.unapplied_only && actual.line_item_id.is_some() {
            return false;
        }
        if let Some(id) = self.line_item_id {
            if actual.line_item_id != Some(id) {
                return false;
            }
        }
        if let Some(month) = self.month {
            if actual.month != Some(month) {
                return false;
            }
        }
        true
    }
}
