//! Fiscal year and month types.
//!
//! A fiscal year runs April through March and is named by the calendar year
//! in which it ends: FY2026 covers 2025-04-01 to 2026-03-31.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar month used to label monthly allocations and actuals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    /// January
    Jan,
    /// February
    Feb,
    /// March
    Mar,
    /// April
    Apr,
    /// May
    May,
    /// June
    Jun,
    /// July
    Jul,
    /// August
    Aug,
    /// September
    Sep,
    /// October
    Oct,
    /// November
    Nov,
    /// December
    Dec,
}

impl Month {
    /// All months in calendar order.
    pub const ALL: [Self; 12] = [
        Self::Jan,
        Self::Feb,
        Self::Mar,
        Self::Apr,
        Self::May,
        Self::Jun,
        Self::Jul,
        Self::Aug,
        Self::Sep,
        Self::Oct,
        Self::Nov,
        Self::Dec,
    ];

    /// All months in fiscal order (April first).
    pub const FISCAL_ORDER: [Self; 12] = [
        Self::Apr,
        Self::May,
        Self::Jun,
        Self::Jul,
        Self::Aug,
        Self::Sep,
        Self::Oct,
        Self::Nov,
        Self::Dec,
        Self::Jan,
        Self::Feb,
        Self::Mar,
    ];

    /// Returns the month a date falls in.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self::from_number(date.month()).unwrap_or(Self::Jan)
    }

    /// Returns the month for a 1-based calendar number.
    #[must_use]
    pub fn from_number(number: u32) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx as usize))
            .copied()
    }

    /// Returns the 1-based calendar number.
    #[must_use]
    pub fn number(self) -> u32 {
        self as u32 + 1
    }

    /// Position in the fiscal year (Apr = 0, Mar = 11).
    #[must_use]
    pub fn fiscal_index(self) -> u32 {
        (self.number() + 8) % 12
    }

    /// Three-letter label stored on records and used as a spreadsheet header.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Jan => "Jan",
            Self::Feb => "Feb",
            Self::Mar => "Mar",
            Self::Apr => "Apr",
            Self::May => "May",
            Self::Jun => "Jun",
            Self::Jul => "Jul",
            Self::Aug => "Aug",
            Self::Sep => "Sep",
            Self::Oct => "Oct",
            Self::Nov => "Nov",
            Self::Dec => "Dec",
        }
    }

    /// Full English month name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Jan => "January",
            Self::Feb => "February",
            Self::Mar => "March",
            Self::Apr => "April",
            Self::May => "May",
            Self::Jun => "June",
            Self::Jul => "July",
            Self::Aug => "August",
            Self::Sep => "September",
            Self::Oct => "October",
            Self::Nov => "November",
            Self::Dec => "December",
        }
    }

    /// Parses a label or full name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(s) || m.name().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown month: {s}"))
    }
}

/// Fiscal year identified by its ending calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiscalYear(pub i32);

impl FiscalYear {
    /// Returns the fiscal year containing a date.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= 4 {
            Self(date.year() + 1)
        } else {
            Self(date.year())
        }
    }

    /// Ending calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.0
    }

    /// First day (April 1st of the previous calendar year).
    #[must_use]
    pub fn start_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0 - 1, 4, 1)
    }

    /// Last day (March 31st).
    #[must_use]
    pub fn end_date(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, 3, 31)
    }

    /// Returns true if the date falls within this fiscal year.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        Self::containing(date) == self
    }

    /// First day of the given month within this fiscal year.
    #[must_use]
    pub fn first_day_of(self, month: Month) -> Option<NaiveDate> {
        let year = if month >= Month::Apr { self.0 - 1 } else { self.0 };
        NaiveDate::from_ymd_opt(year, month.number(), 1)
    }

    /// Display label, e.g. `FY2026`.
    #[must_use]
    pub fn label(self) -> String {
        format!("FY{}", self.0)
    }

    /// Parses `FY2026`, `2026` or `2025-26`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s
            .strip_prefix("FY")
            .or_else(|| s.strip_prefix("fy"))
            .unwrap_or(s)
            .trim();

        if let Some((start, end)) = s.split_once('-') {
            let start: i32 = start.trim().parse().ok()?;
            let end: i32 = end.trim().parse().ok()?;
            let expected = start + 1;
            let matches = if end < 100 {
                end == expected % 100
            } else {
                end == expected
            };
            return matches.then_some(Self(expected));
        }

        s.parse().ok().map(Self)
    }
}

impl std::fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FY{}", self.0)
    }
}
