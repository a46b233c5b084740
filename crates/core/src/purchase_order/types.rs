//! Purchase order types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use budgetrack_shared::types::{
    CurrencyCode, LineItemId, PurchaseOrderId, UserId, checked_convert, to_lac,
};

/// Purchase order status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoStatus {
    /// Newly created.
    #[default]
    Draft,
    /// Approved for spending.
    Approved,
    /// Fully consumed.
    Closed,
    /// Withdrawn.
    Cancelled,
}

impl PoStatus {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Approved => "Approved",
            Self::Closed => "Closed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Parses a status name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "approved" => Some(Self::Approved),
            "closed" => Some(Self::Closed),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for PoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line item linked to a purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoLineItemLink {
    /// Linked line item.
    pub line_item_id: LineItemId,
    /// Portion of the PO allocated to the line item.
    pub allocated_amount: Decimal,
}

/// A purchase order with its line item links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    /// PO ID.
    pub id: PurchaseOrderId,
    /// Unique PO number.
    pub po_number: String,
    /// PO date.
    pub po_date: NaiveDate,
    /// Vendor name.
    pub vendor: String,
    /// PO currency.
    pub currency: CurrencyCode,
    /// Value in `currency`.
    pub po_value: Decimal,
    /// Rate to the common currency.
    pub exchange_rate: Decimal,
    /// `po_value * exchange_rate`.
    pub common_currency_value: Decimal,
    /// Common currency value in lakhs.
    pub value_in_lac: Decimal,
    /// Lifecycle status.
    pub status: PoStatus,
    /// Purchase requisition number.
    pub pr_number: Option<String>,
    /// Purchase requisition date.
    pub pr_date: Option<NaiveDate>,
    /// Purchase requisition value.
    pub pr_value: Option<Decimal>,
    /// Creating user.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Linked line items.
    pub linked_line_items: Vec<PoLineItemLink>,
}

/// Derives `(common_currency_value, value_in_lac)`.
///
/// Returns `None` when the common currency value is not storable.
#[must_use]
pub fn derive_values(po_value: Decimal, exchange_rate: Decimal) -> Option<(Decimal, Decimal)> {
    let common = checked_convert(po_value, exchange_rate)?;
    Some((common, to_lac(common)))
}

/// Input for creating a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseOrder {
    /// Unique PO number.
    pub po_number: String,
    /// PO date.
    pub po_date: NaiveDate,
    /// Vendor name.
    pub vendor: String,
    /// PO currency.
    pub currency: CurrencyCode,
    /// Value in `currency`.
    pub po_value: Decimal,
    /// Rate to the common currency; 1 when absent.
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
    /// Purchase requisition number.
    #[serde(default)]
    pub pr_number: Option<String>,
    /// Purchase requisition date.
    #[serde(default)]
    pub pr_date: Option<NaiveDate>,
    /// Purchase requisition value.
    #[serde(default)]
    pub pr_value: Option<Decimal>,
    /// Line items to link.
    #[serde(default)]
    pub linked_line_items: Vec<PoLineItemLink>,
}

/// Partial update of a purchase order. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePurchaseOrder {
    /// New PO number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_number: Option<String>,
    /// New PO date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_date: Option<NaiveDate>,
    /// New vendor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// New currency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    /// New value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub po_value: Option<Decimal>,
    /// New exchange rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<Decimal>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PoStatus>,
    /// New PR number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<String>,
    /// New PR date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_date: Option<NaiveDate>,
    /// New PR value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_value: Option<Decimal>,
    /// Replacement set of links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_line_items: Option<Vec<PoLineItemLink>>,
}

/// Filters for listing purchase orders.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderFilter {
    /// Case-sensitive substring of the PO or PR number.
    pub search: Option<String>,
    /// Exact status.
    pub status: Option<PoStatus>,
    /// Exact vendor.
    pub vendor: Option<String>,
}

impl PurchaseOrderFilter {
    /// Returns true if `po` passes the filter.
    #[must_use]
    pub fn matches(&self, po: &PurchaseOrder) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let in_po = po.po_number.contains(search);
            let in_pr = po.pr_number.as_deref().is_some_and(|pr| pr.contains(search));
            if !in_po && !in_pr {
                return false;
            }
        }
        if self.status.is_some_and(|status| status != po.status) {
            return false;
        }
        if self.vendor.as_deref().is_some_and(|vendor| vendor != po.vendor) {
            return false;
        }
        true
    }
}
