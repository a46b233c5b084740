//! Spreadsheet (CSV) helpers shared by the import and export adapters.

pub mod budget_import;
pub mod export;

pub use budget_import::{
    BudgetImportOutcome, BudgetImportReport, BudgetImporter, BudgetRowReport, RawBudgetRow,
    UpdatedLineItem, parse_budget_csv,
};
pub use export::{BudgetExportRow, ExportTemplate, render_budget_csv};

use std::collections::HashMap;

/// A parsed sheet: header row plus data rows, cells trimmed.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    /// Header cells.
    pub headers: Vec<String>,
    /// Data rows.
    pub rows: Vec<Vec<String>>,
}

/// Reads CSV bytes into a [`Sheet`].
///
/// A UTF-8 byte order mark on the first header is ignored. Rows may have
/// fewer or more cells than the header.
///
/// # Errors
///
/// Returns a message if the data is not valid CSV or has no header row.
pub fn read_sheet(data: &[u8]) -> Result<Sheet, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err("file has no header row".to_string());
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        rows.push(record.iter().map(ToString::to_string).collect());
    }

    Ok(Sheet { headers, rows })
}

/// Lower-cases a header and strips everything but letters and digits.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Column lookup by normalized header name.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    /// Indexes `headers`; the first occurrence of a name wins.
    #[must_use]
    pub fn new(headers: &[String]) -> Self {
        let mut columns = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            columns.entry(normalize_header(header)).or_insert(idx);
        }
        Self { columns }
    }

    /// Position of the first matching alias.
    #[must_use]
    pub fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| self.columns.get(*alias).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Invoice No."), "invoiceno");
        assert_eq!(normalize_header("  Budget_Head "), "budgethead");
    }

    #[test]
    fn test_read_sheet_strips_bom_and_trims() {
        let sheet = read_sheet("\u{feff}UID, Jan \nLI-1, 10 \n".as_bytes()).unwrap();
        assert_eq!(sheet.headers, vec!["UID", "Jan"]);
        assert_eq!(sheet.rows, vec![vec!["LI-1".to_string(), "10".to_string()]]);
    }

    #[test]
    fn test_read_sheet_rejects_empty_input() {
        assert!(read_sheet(b"").is_err());
    }

    #[test]
    fn test_header_index_aliases() {
        let headers = vec!["Invoice Number".to_string(), "Amount".to_string()];
        let index = HeaderIndex::new(&headers);
        assert_eq!(index.find(&["invoiceno", "invoicenumber"]), Some(0));
        assert_eq!(index.find(&["amount"]), Some(1));
        assert_eq!(index.find(&["currency"]), None);
    }
}
