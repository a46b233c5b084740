//! Actuals spreadsheet import.
//!
//! Rows are validated one by one and partitioned into accepted and rejected.
//! A dry run only reports; a commit stores every accepted row in one batch,
//! so either all accepted rows are stored or none are.

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use budgetrack_shared::types::{CurrencyCode, MAX_AMOUNT, storable_amount};

use super::error::ActualsError;
use super::store::ActualStore;
use super::types::{Actual, NewActual};
use crate::currency::{CurrencyConverter, CurrencyError, RateStore};
use crate::fiscal::Month;
use crate::spreadsheet::{HeaderIndex, read_sheet};

/// Accepted invoice date formats.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"];

/// Parses an invoice date in any accepted format.
#[must_use]
pub fn parse_invoice_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

fn parse_amount(value: &str) -> Option<Decimal> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&cleaned).ok()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// One unvalidated sheet row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawActualRow {
    /// 1-based data row number (the header row is not counted).
    pub row_index: usize,
    /// Invoice number cell.
    pub invoice_no: String,
    /// Invoice date cell.
    pub invoice_date: String,
    /// Amount cell.
    pub amount: String,
    /// Currency cell.
    pub currency: Option<String>,
    /// Vendor cell.
    pub vendor: Option<String>,
    /// Description cell.
    pub description: Option<String>,
}

impl RawActualRow {
    /// Creates a row with the required cells only.
    #[must_use]
    pub fn new(
        row_index: usize,
        invoice_no: impl Into<String>,
        invoice_date: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            row_index,
            invoice_no: invoice_no.into(),
            invoice_date: invoice_date.into(),
            amount: amount.into(),
            ..Self::default()
        }
    }

    fn report(&self, errors: Option<Vec<String>>) -> ImportRowReport {
        let invoice_date = parse_invoice_date(&self.invoice_date).map_or_else(
            || self.invoice_date.trim().to_string(),
            |d| d.format("%Y-%m-%d").to_string(),
        );
        ImportRowReport {
            row_index: self.row_index,
            invoice_no: self.invoice_no.trim().to_string(),
            invoice_date,
            amount: self.amount.trim().to_string(),
            errors,
        }
    }
}

/// Parses an actuals CSV sheet.
///
/// Required columns: `Invoice No`, `Invoice Date`, `Amount`. Optional:
/// `Currency`, `Vendor`, `Description`. Header matching ignores case, spaces
/// and punctuation. Blank rows are skipped but still counted.
pub fn parse_actuals_csv(data: &[u8]) -> Result<Vec<RawActualRow>, ActualsError> {
    let sheet = read_sheet(data).map_err(ActualsError::InvalidFile)?;
    let headers = HeaderIndex::new(&sheet.headers);

    let invoice_no = headers
        .find(&["invoiceno", "invoicenumber", "invoice"])
        .ok_or_else(|| ActualsError::MissingColumn("Invoice No".to_string()))?;
    let invoice_date = headers
        .find(&["invoicedate", "date"])
        .ok_or_else(|| ActualsError::MissingColumn("Invoice Date".to_string()))?;
    let amount = headers
        .find(&["amount", "invoiceamount"])
        .ok_or_else(|| ActualsError::MissingColumn("Amount".to_string()))?;
    let currency = headers.find(&["currency"]);
    let vendor = headers.find(&["vendor", "vendorname"]);
    let description = headers.find(&["description"]);

    let rows = sheet
        .rows
        .iter()
        .enumerate()
        .filter(|(_, record)| record.iter().any(|cell| !cell.trim().is_empty()))
        .map(|(i, record)| {
            let cell = |idx: usize| {
                record
                    .get(idx)
                    .map(String::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            let optional =
                |idx: Option<usize>| non_blank(idx.and_then(|c| record.get(c)).map(String::as_str));
            RawActualRow {
                row_index: i + 1,
                invoice_no: cell(invoice_no),
                invoice_date: cell(invoice_date),
                amount: cell(amount),
                currency: optional(currency),
                vendor: optional(vendor),
                description: optional(description),
            }
        })
        .collect();

    Ok(rows)
}

/// Per-row outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRowReport {
    /// 1-based data row number.
    pub row_index: usize,
    /// Invoice number as read.
    pub invoice_no: String,
    /// Invoice date, normalized to `YYYY-MM-DD` when parseable.
    pub invoice_date: String,
    /// Amount as read.
    pub amount: String,
    /// Reasons the row was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

/// Accepted and rejected rows of an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    /// Rows that passed validation.
    pub accepted: Vec<ImportRowReport>,
    /// Rows that failed validation.
    pub rejected: Vec<ImportRowReport>,
}

/// Result of an import run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    /// Whether this was a dry run.
    pub dry_run: bool,
    /// Row-level report.
    pub report: ImportReport,
    /// Stored actuals; empty on a dry run.
    pub inserted: Vec<Actual>,
}

/// Validates and stores imported actuals.
pub struct ActualsImporter<S: ActualStore, R: RateStore> {
    store: Arc<S>,
    converter: CurrencyConverter<R>,
    base_currency: CurrencyCode,
}

impl<S: ActualStore, R: RateStore> ActualsImporter<S, R> {
    /// Creates a new importer converting foreign amounts into `base_currency`.
    pub fn new(store: Arc<S>, rates: Arc<R>, base_currency: CurrencyCode) -> Self {
        Self {
            store,
            converter: CurrencyConverter::new(rates),
            base_currency,
        }
    }

    /// Validates every row and, unless `dry_run`, stores the accepted ones.
    pub async fn import(
        &self,
        rows: Vec<RawActualRow>,
        dry_run: bool,
    ) -> Result<ImportOutcome, ActualsError> {
        let mut report = ImportReport::default();
        let mut accepted = Vec::new();

        for row in &rows {
            match self.validate_row(row).await? {
                Ok(actual) => {
                    report.accepted.push(row.report(None));
                    accepted.push(actual);
                }
                Err(errors) => report.rejected.push(row.report(Some(errors))),
            }
        }

        if !report.rejected.is_empty() {
            warn!(
                rejected = report.rejected.len(),
                accepted = report.accepted.len(),
                "Actuals import has rejected rows"
            );
        }

        let inserted = if dry_run || accepted.is_empty() {
            Vec::new()
        } else {
            self.store.insert_actuals(accepted).await?
        };

        info!(
            dry_run,
            rows = rows.len(),
            inserted = inserted.len(),
            "Actuals import finished"
        );

        Ok(ImportOutcome {
            dry_run,
            report,
            inserted,
        })
    }

    /// Outer error: lookup failure. Inner error: row-level messages.
    async fn validate_row(
        &self,
        row: &RawActualRow,
    ) -> Result<Result<NewActual, Vec<String>>, ActualsError> {
        let mut errors = Vec::new();

        let invoice_no = row.invoice_no.trim();
        if invoice_no.is_empty() {
            errors.push("Invoice number is required".to_string());
        }

        let invoice_date = parse_invoice_date(&row.invoice_date);
        if invoice_date.is_none() {
            errors.push(format!(
                "Invalid invoice date '{}': expected YYYY-MM-DD, DD-MM-YYYY or DD/MM/YYYY",
                row.invoice_date.trim()
            ));
        }

        let amount = parse_amount(&row.amount);
        match amount {
            None => errors.push(format!("Amount '{}' is not a number", row.amount.trim())),
            Some(a) if a <= Decimal::ZERO => {
                errors.push("Amount must be greater than zero".to_string());
            }
            Some(a) if storable_amount(a).is_none() => {
                errors.push(format!("Amount exceeds {MAX_AMOUNT}"));
            }
            Some(_) => {}
        }

        let currency = match non_blank(row.currency.as_deref()) {
            None => Some(self.base_currency.clone()),
            Some(code) => match CurrencyCode::parse(&code) {
                Ok(c) => Some(c),
                Err(msg) => {
                    errors.push(msg);
                    None
                }
            },
        };

        let (Some(invoice_date), Some(amount), Some(currency)) = (invoice_date, amount, currency)
        else {
            return Ok(Err(errors));
        };
        if !errors.is_empty() {
            return Ok(Err(errors));
        }

        let converted_amount = if currency == self.base_currency {
            None
        } else {
            match self
                .converter
                .convert(amount, &currency, &self.base_currency, Some(invoice_date))
                .await
            {
                Ok(conversion) => Some(conversion.converted_amount),
                Err(
                    err @ (CurrencyError::RateNotFound { .. }
                    | CurrencyError::ConversionOutOfRange { .. }),
                ) => {
                    return Ok(Err(vec![err.to_string()]));
                }
                Err(err) => return Err(err.into()),
            }
        };

        Ok(Ok(NewActual {
            invoice_no: invoice_no.to_string(),
            invoice_date,
            vendor: non_blank(row.vendor.as_deref()),
            description: non_blank(row.description.as_deref()),
            amount,
            currency,
            converted_amount,
            month: Month::from_date(invoice_date),
        }))
    }
}

#[cfg(test)]
#[path = "import_tests.rs"]
mod tests;
