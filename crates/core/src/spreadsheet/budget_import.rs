//! Budget upload-template import.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use budgetrack_shared::types::{LineItemId, MAX_AMOUNT, storable_amount};

use super::{HeaderIndex, read_sheet};
use crate::budget::{BudgetError, LineItemStore, MonthlyBudgetAggregator};
use crate::fiscal::Month;

/// One unvalidated row of the upload template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBudgetRow {
    /// 1-based data row number.
    pub row_index: usize,
    /// UID cell.
    pub uid: String,
    /// Non-blank month cells.
    pub months: Vec<(Month, String)>,
}

/// Parses an upload-template CSV (UID plus any of the month columns).
pub fn parse_budget_csv(data: &[u8]) -> Result<Vec<RawBudgetRow>, BudgetError> {
    let sheet = read_sheet(data).map_err(BudgetError::Validation)?;
    let headers = HeaderIndex::new(&sheet.headers);

    let uid = headers
        .find(&["uid", "lineitemuid"])
        .ok_or_else(|| BudgetError::Validation("Missing required column: UID".to_string()))?;

    let month_columns: Vec<(Month, usize)> = Month::ALL
        .iter()
        .filter_map(|m| {
            let label = m.label().to_ascii_lowercase();
            let name = m.name().to_ascii_lowercase();
            headers.find(&[label.as_str(), name.as_str()]).map(|idx| (*m, idx))
        })
        .collect();

    if month_columns.is_empty() {
        return Err(BudgetError::Validation(
            "Sheet has no month columns".to_string(),
        ));
    }

    let rows = sheet
        .rows
        .iter()
        .enumerate()
        .filter(|(_, record)| record.iter().any(|cell| !cell.is_empty()))
        .map(|(i, record)| RawBudgetRow {
            row_index: i + 1,
            uid: record.get(uid).cloned().unwrap_or_default(),
            months: month_columns
                .iter()
                .filter_map(|(month, idx)| {
                    record
                        .get(*idx)
                        .filter(|cell| !cell.is_empty())
                        .map(|cell| (*month, cell.clone()))
                })
                .collect(),
        })
        .collect();

    Ok(rows)
}

/// Per-row outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRowReport {
    /// 1-based data row number.
    pub row_index: usize,
    /// UID as read.
    pub uid: String,
    /// Sum of the row's month cells when valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_total: Option<Decimal>,
    /// Reasons the row was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Accepted and rejected rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetImportReport {
    /// Rows that passed validation (and, on a commit, were saved).
    pub accepted: Vec<BudgetRowReport>,
    /// Rows that failed validation or could not be saved.
    pub rejected: Vec<BudgetRowReport>,
}

impl BudgetImportReport {
    /// Moves an accepted row to `rejected` after its write failed.
    fn reject_after_commit(&mut self, row_index: usize, uid: &str, err: &BudgetError) {
        self.accepted.retain(|row| row.row_index != row_index);
        let message = match err {
            BudgetError::Repository(_) => "Row could not be saved".to_string(),
            other => other.to_string(),
        };
        self.rejected.push(BudgetRowReport {
            row_index,
            uid: uid.to_string(),
            row_total: None,
            errors: Some(vec![message]),
        });
        self.rejected.sort_by_key(|row| row.row_index);
    }
}

/// Line item total after a committed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedLineItem {
    /// Line item uid.
    pub uid: String,
    /// New total budget.
    pub total_budget: Decimal,
}

/// Result of a budget import run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetImportOutcome {
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Row-level report.
    pub report: BudgetImportReport,
    /// Updated line items; empty on a dry run.
    pub updated: Vec<UpdatedLineItem>,
}

/// Imports monthly allocations from the upload template.
pub struct BudgetImporter<S: LineItemStore> {
    store: Arc<S>,
    aggregator: MonthlyBudgetAggregator<S>,
}

impl<S: LineItemStore> BudgetImporter<S> {
    /// Creates a new importer.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            aggregator: MonthlyBudgetAggregator::new(Arc::clone(&store)),
            store,
        }
    }

    /// Validates rows and, unless `dry_run`, upserts each accepted row's months.
    ///
    /// Each row is written atomically; rows are committed independently. A row
    /// whose write fails is moved to `rejected` and the remaining rows are
    /// still committed, so `accepted` always lists exactly what was saved.
    pub async fn import(
        &self,
        rows: Vec<RawBudgetRow>,
        dry_run: bool,
    ) -> Result<BudgetImportOutcome, BudgetError> {
        let mut report = BudgetImportReport::default();
        let mut accepted = Vec::new();
        let mut seen = HashSet::new();

        for row in &rows {
            let uid = row.uid.trim().to_string();
            let mut errors = Vec::new();
            let mut line_item_id: Option<LineItemId> = None;

            if uid.is_empty() {
                errors.push("UID is required".to_string());
            } else if !seen.insert(uid.clone()) {
                errors.push(format!("UID {uid} appears more than once"));
            } else {
                match self.store.find_line_item_by_uid(&uid).await? {
                    Some(item) => line_item_id = Some(item.id),
                    None => errors.push(format!("Unknown line item UID: {uid}")),
                }
            }

            let mut entries = Vec::with_capacity(row.months.len());
            for (month, cell) in &row.months {
                let cleaned: String = cell.chars().filter(|c| *c != ',').collect();
                match Decimal::from_str(cleaned.trim()) {
                    Ok(amount) if amount < Decimal::ZERO => {
                        errors.push(format!("{month}: amount cannot be negative"));
                    }
                    Ok(amount) if storable_amount(amount).is_none() => {
                        errors.push(format!("{month}: amount exceeds {MAX_AMOUNT}"));
                    }
                    Ok(amount) => entries.push((*month, amount)),
                    Err(_) => errors.push(format!("{month}: '{cell}' is not a number")),
                }
            }

            let row_total = entries
                .iter()
                .try_fold(Decimal::ZERO, |total, (_, amount)| total.checked_add(*amount))
                .and_then(storable_amount);
            if row_total.is_none() && errors.is_empty() {
                errors.push(format!("Row total exceeds {MAX_AMOUNT}"));
            }

            match (line_item_id, row_total) {
                (Some(id), Some(row_total)) if errors.is_empty() => {
                    report.accepted.push(BudgetRowReport {
                        row_index: row.row_index,
                        uid: uid.clone(),
                        row_total: Some(row_total),
                        errors: None,
                    });
                    accepted.push((row.row_index, uid, id, entries));
                }
                _ => report.rejected.push(BudgetRowReport {
                    row_index: row.row_index,
                    uid,
                    row_total: None,
                    errors: Some(errors),
                }),
            }
        }

        let mut updated = Vec::new();
        if !dry_run {
            for (row_index, uid, id, entries) in accepted {
                match self.aggregator.upsert_months(id, entries).await {
                    Ok(total_budget) => updated.push(UpdatedLineItem { uid, total_budget }),
                    Err(err) => {
                        warn!(row_index, %uid, error = %err, "Budget row not saved");
                        report.reject_after_commit(row_index, &uid, &err);
                    }
                }
            }
        }

        info!(
            dry_run,
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            updated = updated.len(),
            "Budget import finished"
        );

        Ok(BudgetImportOutcome {
            dry_run,
            report,
            updated,
        })
    }
}
