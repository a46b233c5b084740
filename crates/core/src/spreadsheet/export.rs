//! Budget export to CSV.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::fiscal::{FiscalYear, Month};

/// Export layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportTemplate {
    /// Editable sheet with one column per month; can be re-imported.
    #[default]
    Upload,
    /// Summary sheet with the total budget only.
    Report,
}

impl ExportTemplate {
    /// Parses `upload` or `report` (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upload" => Some(Self::Upload),
            "report" => Some(Self::Report),
            _ => None,
        }
    }

    /// Column headers for this layout.
    #[must_use]
    pub fn headers(self) -> Vec<&'static str> {
        let mut headers = vec!["UID", "Description", "Tower", "Budget Head"];
        match self {
            Self::Upload => {
                headers.extend(Month::ALL.iter().map(|m| m.label()));
                headers.push("Total");
            }
            Self::Report => headers.push("Total Budget"),
        }
        headers
    }

    /// Download file name, e.g. `budget-upload-FY2026.csv`.
    #[must_use]
    pub fn file_name(self, fiscal_year: Option<FiscalYear>) -> String {
        let kind = match self {
            Self::Upload => "upload",
            Self::Report => "report",
        };
        match fiscal_year {
            Some(fy) => format!("budget-{kind}-{}.csv", fy.label()),
            None => format!("budget-{kind}.csv"),
        }
    }
}

/// One line item as exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetExportRow {
    /// Line item uid.
    pub uid: String,
    /// Description.
    pub description: String,
    /// Tower name.
    pub tower: String,
    /// Budget head name.
    pub budget_head: String,
    /// Monthly amounts.
    pub allocations: Vec<(Month, Option<Decimal>)>,
    /// Stored total budget.
    pub total_budget: Decimal,
}

impl BudgetExportRow {
    fn amount_for(&self, month: Month) -> Decimal {
        self.allocations
            .iter()
            .find(|(m, _)| *m == month)
            .and_then(|(_, amount)| *amount)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Renders rows as CSV in the given layout.
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn render_budget_csv(
    template: ExportTemplate,
    rows: &[BudgetExportRow],
) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(template.headers())?;

    for row in rows {
        let mut record = vec![
            row.uid.clone(),
            row.description.clone(),
            row.tower.clone(),
            row.budget_head.clone(),
        ];
        match template {
            ExportTemplate::Upload => {
                let mut total = Decimal::ZERO;
                for month in Month::ALL {
                    let amount = row.amount_for(month);
                    total += amount;
                    record.push(amount.normalize().to_string());
                }
                record.push(total.normalize().to_string());
            }
            ExportTemplate::Report => record.push(row.total_budget.normalize().to_string()),
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
