//! Storage capabilities needed by the PO lifecycle manager.

use std::future::Future;

use budgetrack_shared::types::{LineItemId, PageRequest, PageResponse, PurchaseOrderId};

use super::error::PurchaseOrderError;
use super::types::{PurchaseOrder, PurchaseOrderFilter};
use crate::audit::NewAuditEntry;

/// Repository trait for purchase orders.
pub trait PurchaseOrderStore: Send + Sync {
    /// Find a PO with its links.
    fn find_purchase_order(
        &self,
        id: PurchaseOrderId,
    ) -> impl Future<Output = Result<Option<PurchaseOrder>, PurchaseOrderError>> + Send;

    /// Returns true if another PO already uses `po_number`.
    fn po_number_exists(
        &self,
        po_number: &str,
        excluding: Option<PurchaseOrderId>,
    ) -> impl Future<Output = Result<bool, PurchaseOrderError>> + Send;

    /// Returns the IDs in `ids` that have no line item.
    fn missing_line_items(
        &self,
        ids: &[LineItemId],
    ) -> impl Future<Output = Result<Vec<LineItemId>, PurchaseOrderError>> + Send;

    /// Insert the PO, its links and the audit entry in one transaction.
    fn insert_purchase_order(
        &self,
        po: PurchaseOrder,
        audit: NewAuditEntry,
    ) -> impl Future<Output = Result<PurchaseOrder, PurchaseOrderError>> + Send;

    /// Update the PO row, optionally replace all links, and append the audit
    /// entry in one transaction.
    fn update_purchase_order(
        &self,
        po: PurchaseOrder,
        replace_links: bool,
        audit: NewAuditEntry,
    ) -> impl Future<Output = Result<PurchaseOrder, PurchaseOrderError>> + Send;

    /// List POs, newest first.
    fn list_purchase_orders(
        &self,
        filter: &PurchaseOrderFilter,
        page: &PageRequest,
    ) -> impl Future<Output = Result<PageResponse<PurchaseOrder>, PurchaseOrderError>> + Send;
}
