//! Purchase order lifecycle service.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use budgetrack_shared::types::{
    LineItemId, MAX_AMOUNT, MAX_RATE, PageRequest, PageResponse, PurchaseOrderId, UserId,
    storable_amount, storable_rate,
};

use super::error::PurchaseOrderError;
use super::store::PurchaseOrderStore;
use super::types::{
    CreatePurchaseOrder, PoLineItemLink, PoStatus, PurchaseOrder, PurchaseOrderFilter,
    UpdatePurchaseOrder, derive_values,
};
use crate::audit::{NewAuditEntry, PURCHASE_ORDER_ENTITY};

/// Creates, updates and queries purchase orders.
///
/// Every mutation appends exactly one audit entry in the same transaction.
pub struct PurchaseOrderService<S: PurchaseOrderStore> {
    store: Arc<S>,
}

impl<S: PurchaseOrderStore> PurchaseOrderService<S> {
    /// Creates a new service.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Creates a `Draft` purchase order.
    pub async fn create(
        &self,
        input: CreatePurchaseOrder,
        user_id: UserId,
    ) -> Result<PurchaseOrder, PurchaseOrderError> {
        let po_number = required("poNumber", &input.po_number)?;
        let vendor = required("vendor", &input.vendor)?;
        validate_po_value(input.po_value)?;
        let exchange_rate = input.exchange_rate.unwrap_or(Decimal::ONE);
        validate_exchange_rate(exchange_rate)?;
        self.validate_links(&input.linked_line_items).await?;

        if self.store.po_number_exists(&po_number, None).await? {
            return Err(PurchaseOrderError::DuplicatePoNumber(po_number));
        }

        validate_pr_value(input.pr_value)?;
        let (common_currency_value, value_in_lac) = derived(input.po_value, exchange_rate)?;
        let now = Utc::now();
        let po = PurchaseOrder {
            id: PurchaseOrderId::new(),
            po_number,
            po_date: input.po_date,
            vendor,
            currency: input.currency,
            po_value: input.po_value,
            exchange_rate,
            common_currency_value,
            value_in_lac,
            status: PoStatus::Draft,
            pr_number: input.pr_number,
            pr_date: input.pr_date,
            pr_value: input.pr_value,
            created_by: user_id,
            created_at: now,
            updated_at: now,
            linked_line_items: input.linked_line_items,
        };

        let snapshot = serde_json::to_value(&po)
            .map_err(|e| PurchaseOrderError::Serialization(e.to_string()))?;
        let audit = NewAuditEntry::created(PURCHASE_ORDER_ENTITY, po.id.into_inner(), user_id, snapshot);

        let created = self.store.insert_purchase_order(po, audit).await?;
        info!(
            po_id = %created.id,
            po_number = %created.po_number,
            links = created.linked_line_items.len(),
            "Purchase order created"
        );
        Ok(created)
    }

    /// Applies a partial update.
    pub async fn update(
        &self,
        id: PurchaseOrderId,
        input: UpdatePurchaseOrder,
        user_id: UserId,
    ) -> Result<PurchaseOrder, PurchaseOrderError> {
        let mut po = self
            .store
            .find_purchase_order(id)
            .await?
            .ok_or(PurchaseOrderError::NotFound(id))?;

        let payload = serde_json::to_value(&input)
            .map_err(|e| PurchaseOrderError::Serialization(e.to_string()))?;

        if let Some(po_number) = &input.po_number {
            let po_number = required("poNumber", po_number)?;
            if po_number != po.po_number && self.store.po_number_exists(&po_number, Some(id)).await? {
                return Err(PurchaseOrderError::DuplicatePoNumber(po_number));
            }
            po.po_number = po_number;
        }
        if let Some(vendor) = &input.vendor {
            po.vendor = required("vendor", vendor)?;
        }
        if let Some(po_date) = input.po_date {
            po.po_date = po_date;
        }
        if let Some(currency) = input.currency {
            po.currency = currency;
        }
        if let Some(status) = input.status {
            po.status = status;
        }
        if input.pr_number.is_some() {
            po.pr_number = input.pr_number;
        }
        if input.pr_date.is_some() {
            po.pr_date = input.pr_date;
        }
        if input.pr_value.is_some() {
            validate_pr_value(input.pr_value)?;
            po.pr_value = input.pr_value;
        }

        if input.po_value.is_some() || input.exchange_rate.is_some() {
            let po_value = input.po_value.unwrap_or(po.po_value);
            let exchange_rate = input.exchange_rate.unwrap_or(po.exchange_rate);
            validate_po_value(po_value)?;
            validate_exchange_rate(exchange_rate)?;
            let (common, lac) = derived(po_value, exchange_rate)?;
            po.po_value = po_value;
            po.exchange_rate = exchange_rate;
            po.common_currency_value = common;
            po.value_in_lac = lac;
        }

        let replace_links = match input.linked_line_items {
            Some(links) => {
                self.validate_links(&links).await?;
                po.linked_line_items = links;
                true
            }
            None => false,
        };

        po.updated_at = Utc::now();
        let audit = NewAuditEntry::updated(PURCHASE_ORDER_ENTITY, id.into_inner(), user_id, payload);

        let updated = self
            .store
            .update_purchase_order(po, replace_links, audit)
            .await?;
        info!(po_id = %id, replace_links, "Purchase order updated");
        Ok(updated)
    }

    /// Returns a PO with its links.
    pub async fn get(&self, id: PurchaseOrderId) -> Result<PurchaseOrder, PurchaseOrderError> {
        self.store
            .find_purchase_order(id)
            .await?
            .ok_or(PurchaseOrderError::NotFound(id))
    }

    /// Lists POs, newest first.
    pub async fn list(
        &self,
        filter: &PurchaseOrderFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<PurchaseOrder>, PurchaseOrderError> {
        self.store.list_purchase_orders(filter, page).await
    }

    async fn validate_links(&self, links: &[PoLineItemLink]) -> Result<(), PurchaseOrderError> {
        let mut seen = HashSet::new();
        for link in links {
            if link.allocated_amount < Decimal::ZERO {
                return Err(PurchaseOrderError::Validation(format!(
                    "allocatedAmount for line item {} cannot be negative",
                    link.line_item_id
                )));
            }
            if storable_amount(link.allocated_amount).is_none() {
                return Err(PurchaseOrderError::Validation(format!(
                    "allocatedAmount for line item {} exceeds {MAX_AMOUNT}",
                    link.line_item_id
                )));
            }
            if !seen.insert(link.line_item_id) {
                return Err(PurchaseOrderError::DuplicateLineItem(link.line_item_id));
            }
        }

        if links.is_empty() {
            return Ok(());
        }
        let ids: Vec<LineItemId> = links.iter().map(|l| l.line_item_id).collect();
        let missing = self.store.missing_line_items(&ids).await?;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PurchaseOrderError::UnknownLineItems(missing))
        }
    }
}

fn required(field: &str, value: &str) -> Result<String, PurchaseOrderError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(PurchaseOrderError::Validation(format!("{field} is required")))
    } else {
        Ok(trimmed.to_string())
    }
}

fn validate_po_value(po_value: Decimal) -> Result<(), PurchaseOrderError> {
    if po_value < Decimal::ZERO {
        return Err(PurchaseOrderError::Validation(
            "poValue cannot be negative".to_string(),
        ));
    }
    if storable_amount(po_value).is_none() {
        return Err(PurchaseOrderError::Validation(format!(
            "poValue exceeds {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

fn validate_pr_value(pr_value: Option<Decimal>) -> Result<(), PurchaseOrderError> {
    match pr_value {
        Some(value) if value < Decimal::ZERO => Err(PurchaseOrderError::Validation(
            "prValue cannot be negative".to_string(),
        )),
        Some(value) if storable_amount(value).is_none() => Err(PurchaseOrderError::Validation(
            format!("prValue exceeds {MAX_AMOUNT}"),
        )),
        _ => Ok(()),
    }
}

fn validate_exchange_rate(rate: Decimal) -> Result<(), PurchaseOrderError> {
    if rate <= Decimal::ZERO {
        return Err(PurchaseOrderError::Validation(
            "exchangeRate must be greater than zero".to_string(),
        ));
    }
    if storable_rate(rate).is_none() {
        return Err(PurchaseOrderError::Validation(format!(
            "exchangeRate exceeds {MAX_RATE}"
        )));
    }
    Ok(())
}

fn derived(po_value: Decimal, exchange_rate: Decimal) -> Result<(Decimal, Decimal), PurchaseOrderError> {
    derive_values(po_value, exchange_rate).ok_or_else(|| {
        PurchaseOrderError::Validation(format!(
            "poValue x exchangeRate exceeds {MAX_AMOUNT}"
        ))
    })
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
