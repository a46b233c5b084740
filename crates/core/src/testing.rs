//! In-memory implementations of the storage traits for service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use budgetrack_shared::types::{
    ActualId, BudgetHeadId, CurrencyCode, LineItemId, PageRequest, PageResponse, PurchaseOrderId,
    TowerId,
};

use crate::actuals::{Actual, ActualFilter, ActualStore, ActualsError, NewActual};
use crate::audit::NewAuditEntry;
use crate::budget::{BudgetError, LineItem, LineItemStore, MonthlyAllocation, sum_allocations};
use crate::currency::{CurrencyError, ExchangeRate, RateStore, select_latest};
use crate::fiscal::{FiscalYear, Month};
use crate::purchase_order::{
    PurchaseOrder, PurchaseOrderError, PurchaseOrderFilter, PurchaseOrderStore,
};

#[derive(Default)]
struct State {
    line_items: HashMap<LineItemId, LineItem>,
    allocations: HashMap<(LineItemId, Month), Option<Decimal>>,
    actuals: Vec<Actual>,
    rates: Vec<ExchangeRate>,
    purchase_orders: Vec<PurchaseOrder>,
    audit: Vec<NewAuditEntry>,
    fail_at: Option<usize>,
}

impl State {
    /// Fails a write once it reaches item `fail_at` of its batch. Nothing
    /// staged before the failure is published, like a rolled back transaction.
    fn check_batch(&self, len: usize) -> Result<(), String> {
        match self.fail_at {
            Some(idx) if idx < len => Err(format!("write failed at item {idx}")),
            _ => Ok(()),
        }
    }
}

/// Mock store backed by mutex-guarded collections.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn add_line_item(&self, uid: &str) -> LineItem {
        let now = Utc::now();
        let item = LineItem {
            id: LineItemId::new(),
            uid: uid.to_string(),
            description: format!("{uid} description"),
            fiscal_year: FiscalYear(2026),
            tower_id: TowerId::new(),
            budget_head_id: BudgetHeadId::new(),
            total_budget: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .line_items
            .insert(item.id, item.clone());
        item
    }

    pub fn line_item(&self, id: LineItemId) -> LineItem {
        self.state.lock().unwrap().line_items[&id].clone()
    }

    pub fn set_allocation(&self, id: LineItemId, month: Month, amount: Option<Decimal>) {
        self.state
            .lock()
            .unwrap()
            .allocations
            .insert((id, month), amount);
    }

    pub fn allocations(&self, id: LineItemId) -> Vec<MonthlyAllocation> {
        let state = self.state.lock().unwrap();
        Month::FISCAL_ORDER
            .iter()
            .filter_map(|month| {
                state
                    .allocations
                    .get(&(id, *month))
                    .map(|amount| MonthlyAllocation {
                        line_item_id: id,
                        month: *month,
                        amount: *amount,
                    })
            })
            .collect()
    }

    pub fn add_actual(&self, actual: Actual) {
        self.state.lock().unwrap().actuals.push(actual);
    }

    pub fn actuals(&self) -> Vec<Actual> {
        self.state.lock().unwrap().actuals.clone()
    }

    pub fn add_rate(&self, rate: ExchangeRate) {
        self.state.lock().unwrap().rates.push(rate);
    }

    pub fn audit_entries(&self) -> Vec<NewAuditEntry> {
        self.state.lock().unwrap().audit.clone()
    }

    pub fn purchase_orders(&self) -> Vec<PurchaseOrder> {
        self.state.lock().unwrap().purchase_orders.clone()
    }

    /// Makes every later write batch fail at item `idx` (zero-based).
    /// Purchase order writes count the PO row as item 0 and links after it.
    pub fn fail_writes_at(&self, idx: usize) {
        self.state.lock().unwrap().fail_at = Some(idx);
    }
}

/// An unapplied INR actual of 100.
pub fn sample_actual(invoice_date: Option<NaiveDate>) -> Actual {
    Actual {
        id: ActualId::new(),
        invoice_no: "INV-1".to_string(),
        invoice_date,
        vendor: Some("Acme".to_string()),
        description: None,
        amount: Decimal::ONE_HUNDRED,
        currency: CurrencyCode::parse("INR").unwrap(),
        converted_amount: None,
        month: None,
        line_item_id: None,
        created_at: Utc::now(),
    }
}

impl LineItemStore for InMemoryStore {
    async fn find_line_item(&self, id: LineItemId) -> Result<Option<LineItem>, BudgetError> {
        Ok(self.state.lock().unwrap().line_items.get(&id).cloned())
    }

    async fn find_line_item_by_uid(&self, uid: &str) -> Result<Option<LineItem>, BudgetError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .line_items
            .values()
            .find(|item| item.uid == uid)
            .cloned())
    }

    async fn list_allocations(&self, id: LineItemId) -> Result<Vec<MonthlyAllocation>, BudgetError> {
        Ok(self.allocations(id))
    }

    async fn list_applied_actuals(&self, id: LineItemId) -> Result<Vec<Actual>, BudgetError> {
        Ok(self
            .actuals()
            .into_iter()
            .filter(|a| a.line_item_id == Some(id))
            .collect())
    }

    async fn upsert_allocations(
        &self,
        id: LineItemId,
        entries: &[(Month, Decimal)],
    ) -> Result<Decimal, BudgetError> {
        let mut state = self.state.lock().unwrap();
        if !state.line_items.contains_key(&id) {
            return Err(BudgetError::LineItemNotFound(id));
        }
        state.check_batch(entries.len()).map_err(BudgetError::Repository)?;

        let mut staged = state.allocations.clone();
        for (month, amount) in entries {
            staged.insert((id, *month), Some(*amount));
        }
        let total = total_of(&staged, id)?;

        state.allocations = staged;
        store_total(&mut state, id, total)?;
        Ok(total)
    }

    async fn refresh_total(&self, id: LineItemId) -> Result<Decimal, BudgetError> {
        let mut state = self.state.lock().unwrap();
        let total = total_of(&state.allocations, id)?;
        store_total(&mut state, id, total)?;
        Ok(total)
    }
}

impl ActualStore for InMemoryStore {
    async fn find_actual(&self, id: ActualId) -> Result<Option<Actual>, ActualsError> {
        Ok(self.actuals().into_iter().find(|a| a.id == id))
    }

    async fn line_item_exists(&self, id: LineItemId) -> Result<bool, ActualsError> {
        Ok(self.state.lock().unwrap().line_items.contains_key(&id))
    }

    async fn apply_to_line_item(
        &self,
        actual_id: ActualId,
        line_item_id: LineItemId,
        month: Month,
    ) -> Result<Actual, ActualsError> {
        let mut state = self.state.lock().unwrap();
        let actual = state
            .actuals
            .iter_mut()
            .find(|a| a.id == actual_id)
            .ok_or(ActualsError::ActualNotFound(actual_id))?;
        actual.line_item_id = Some(line_item_id);
        actual.month = Some(month);
        Ok(actual.clone())
    }

    async fn insert_actuals(&self, actuals: Vec<NewActual>) -> Result<Vec<Actual>, ActualsError> {
        self.state
            .lock()
            .unwrap()
            .check_batch(actuals.len())
            .map_err(ActualsError::Repository)?;

        let created: Vec<Actual> = actuals
            .into_iter()
            .map(|new| Actual {
                id: ActualId::new(),
                invoice_no: new.invoice_no,
                invoice_date: Some(new.invoice_date),
                vendor: new.vendor,
                description: new.description,
                amount: new.amount,
                currency: new.currency,
                converted_amount: new.converted_amount,
                month: Some(new.month),
                line_item_id: None,
                created_at: Utc::now(),
            })
            .collect();
        self.state
            .lock()
            .unwrap()
            .actuals
            .extend(created.iter().cloned());
        Ok(created)
    }

    async fn list_actuals(
        &self,
        filter: &ActualFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<Actual>, ActualsError> {
        let mut matching: Vec<Actual> = self
            .actuals()
            .into_iter()
            .filter(|a| filter.matches(a))
            .collect();
        matching.reverse();
        Ok(paginate(matching, page))
    }
}

impl RateStore for InMemoryStore {
    async fn latest_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        as_of: NaiveDate,
    ) -> Result<Option<ExchangeRate>, CurrencyError> {
        let state = self.state.lock().unwrap();
        Ok(select_latest(&state.rates, from, to, as_of).cloned())
    }

    async fn upsert_rate(&self, rate: ExchangeRate) -> Result<ExchangeRate, CurrencyError> {
        let mut state = self.state.lock().unwrap();
        state.rates.retain(|r| {
            !(r.from_currency == rate.from_currency
                && r.to_currency == rate.to_currency
                && r.effective_date == rate.effective_date)
        });
        state.rates.push(rate.clone());
        Ok(rate)
    }
}

impl PurchaseOrderStore for InMemoryStore {
    async fn find_purchase_order(
        &self,
        id: PurchaseOrderId,
    ) -> Result<Option<PurchaseOrder>, PurchaseOrderError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .purchase_orders
            .iter()
            .find(|po| po.id == id)
            .cloned())
    }

    async fn po_number_exists(
        &self,
        po_number: &str,
        excluding: Option<PurchaseOrderId>,
    ) -> Result<bool, PurchaseOrderError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .purchase_orders
            .iter()
            .any(|po| po.po_number == po_number && Some(po.id) != excluding))
    }

    async fn missing_line_items(
        &self,
        ids: &[LineItemId],
    ) -> Result<Vec<LineItemId>, PurchaseOrderError> {
        let state = self.state.lock().unwrap();
        Ok(ids
            .iter()
            .filter(|id| !state.line_items.contains_key(id))
            .copied()
            .collect())
    }

    async fn insert_purchase_order(
        &self,
        po: PurchaseOrder,
        audit: NewAuditEntry,
    ) -> Result<PurchaseOrder, PurchaseOrderError> {
        let mut state = self.state.lock().unwrap();
        state
            .check_batch(1 + po.linked_line_items.len())
            .map_err(PurchaseOrderError::Repository)?;
        state.purchase_orders.push(po.clone());
        state.audit.push(audit);
        Ok(po)
    }

    async fn update_purchase_order(
        &self,
        po: PurchaseOrder,
        replace_links: bool,
        audit: NewAuditEntry,
    ) -> Result<PurchaseOrder, PurchaseOrderError> {
        let mut state = self.state.lock().unwrap();
        let batch = if replace_links { 1 + po.linked_line_items.len() } else { 1 };
        state.check_batch(batch).map_err(PurchaseOrderError::Repository)?;
        let stored = state
            .purchase_orders
            .iter_mut()
            .find(|p| p.id == po.id)
            .ok_or(PurchaseOrderError::NotFound(po.id))?;
        let links = if replace_links {
            po.linked_line_items.clone()
        } else {
            stored.linked_line_items.clone()
        };
        *stored = PurchaseOrder {
            linked_line_items: links,
            ..po
        };
        let updated = stored.clone();
        state.audit.push(audit);
        Ok(updated)
    }

    async fn list_purchase_orders(
        &self,
        filter: &PurchaseOrderFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<PurchaseOrder>, PurchaseOrderError> {
        let mut matching: Vec<PurchaseOrder> = self
            .state
            .lock()
            .unwrap()
            .purchase_orders
            .iter()
            .filter(|po| filter.matches(po))
            .cloned()
            .collect();
        matching.reverse();
        Ok(paginate(matching, page))
    }
}

fn total_of(
    allocations: &HashMap<(LineItemId, Month), Option<Decimal>>,
    id: LineItemId,
) -> Result<Decimal, BudgetError> {
    let rows: Vec<MonthlyAllocation> = Month::FISCAL_ORDER
        .iter()
        .filter_map(|month| {
            allocations.get(&(id, *month)).map(|amount| MonthlyAllocation {
                line_item_id: id,
                month: *month,
                amount: *amount,
            })
        })
        .collect();
    sum_allocations(&rows)
}

fn store_total(state: &mut State, id: LineItemId, total: Decimal) -> Result<(), BudgetError> {
    let item = state
        .line_items
        .get_mut(&id)
        .ok_or(BudgetError::LineItemNotFound(id))?;
    item.total_budget = total;
    item.updated_at = Utc::now();
    Ok(())
}

fn paginate<T>(items: Vec<T>, page: &PageRequest) -> PageResponse<T> {
    let total = items.len() as u64;
    let offset = usize::try_from(page.offset()).unwrap();
    let limit = usize::try_from(page.limit()).unwrap();
    let data = items.into_iter().skip(offset).take(limit).collect();
    PageResponse::new(data, page, total)
}
