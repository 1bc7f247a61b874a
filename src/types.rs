//! Core data model types.
//!
//! A workbook sheet is loaded into a [`SheetGrid`] of raw [`Cell`]s. The layout parser turns the
//! grid into [`LongRecord`]s keyed by [`CanonicalMonth`]; curation attaches short labels
//! ([`CuratedRecord`]) and the reshaper pivots them into a [`WideTable`].

use std::collections::HashMap;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// A single raw spreadsheet value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Blank cell (or a position outside the used range).
    Empty,
    /// Integer-typed cell.
    Int(i64),
    /// Floating point cell.
    Float(f64),
    /// Text cell.
    Text(String),
    /// Boolean cell.
    Bool(bool),
    /// Native date/time cell.
    DateTime(NaiveDateTime),
    /// Spreadsheet error value (`#N/A`, `#REF!`, ...). Treated as missing.
    Error(String),
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Cell {
    /// `true` for blank and error cells.
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Empty | Cell::Error(_))
    }

    /// The text content, if this is a text cell.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Render the cell the way it reads in the sheet. Missing cells render as `""`.
    pub fn to_plain_string(&self) -> String {
        match self {
            Cell::Empty | Cell::Error(_) => String::new(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
            Cell::DateTime(dt) => dt.to_string(),
        }
    }

    /// Numeric coercion: numbers pass through, numeric text is parsed, anything else is `None`.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) if f.is_finite() => Some(*f),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

/// A named sheet as a grid of cells addressed by absolute zero-based (row, column) positions.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    /// Sheet name, exactly as it appears in the workbook.
    pub name: String,
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl SheetGrid {
    /// Create a grid. Rows may be ragged; missing trailing cells read as [`Cell::Empty`].
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            name: name.into(),
            rows,
            width,
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns (length of the longest row).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell at `(row, col)`; positions outside the grid read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// A calendar month, stored as the last day of that month.
///
/// Displays as the first of the month (`YYYY-MM-01`), which is the convention used in outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalMonth(NaiveDate);

impl CanonicalMonth {
    /// Month-end for `year`/`month`. Returns `None` for an invalid month.
    pub fn from_ymd(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        next_first.pred_opt().map(Self)
    }

    /// Truncate any date to its containing month.
    pub fn containing(date: NaiveDate) -> Self {
        Self::from_ymd(date.year(), date.month()).unwrap_or(Self(date))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Last day of the month (the internal representation).
    pub fn last_day(&self) -> NaiveDate {
        self.0
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.0.with_day(1).unwrap_or(self.0)
    }

    /// Human-readable label: full month name and year, e.g. `January 2023`.
    pub fn label(&self) -> String {
        self.0.format("%B %Y").to_string()
    }
}

impl fmt::Display for CanonicalMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_day().format("%Y-%m-%d"))
    }
}

/// Location of one month's values within a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapEntry {
    pub month: CanonicalMonth,
    /// Column holding the index level.
    pub index_col: usize,
    /// Column holding the percent change; always `index_col + 1` when present.
    pub pct_col: Option<usize>,
}

/// One (category, month) observation extracted from a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    /// Category code, e.g. `01`, `0111`, `0999`, `12+13`.
    pub code: String,
    /// Category label as printed in the sheet.
    pub name: String,
    pub month: CanonicalMonth,
    pub index_value: Option<f64>,
    pub pct_change: Option<f64>,
}

/// A [`LongRecord`] with its curated short label attached.
#[derive(Debug, Clone, PartialEq)]
pub struct CuratedRecord {
    pub record: LongRecord,
    /// `None` when the (code, name) pair has no curation entry.
    pub short_name: Option<String>,
}

/// One row of an external curation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurationEntry {
    pub code: String,
    pub name: String,
    pub short_name: String,
}

impl CurationEntry {
    pub fn new(code: impl Into<String>, name: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            short_name: short_name.into(),
        }
    }
}

/// Mapping from (code, name) to a short label; row order is the presentation order.
///
/// Keys match exactly (case and surrounding whitespace included). When a key repeats, the first
/// entry wins.
#[derive(Debug, Clone)]
pub struct CurationMapping {
    entries: Vec<CurationEntry>,
    by_key: HashMap<(String, String), usize>,
    order: HashMap<String, usize>,
}

impl CurationMapping {
    pub fn new(entries: Vec<CurationEntry>) -> Self {
        let mut by_key = HashMap::with_capacity(entries.len());
        let mut order = HashMap::with_capacity(entries.len());
        for (i, e) in entries.iter().enumerate() {
            by_key.entry((e.code.clone(), e.name.clone())).or_insert(i);
            let next = order.len();
            order.entry(e.short_name.clone()).or_insert(next);
        }
        Self {
            entries,
            by_key,
            order,
        }
    }

    pub fn entries(&self) -> &[CurationEntry] {
        &self.entries
    }

    /// Short label for a (code, name) pair.
    pub fn short_name(&self, code: &str, name: &str) -> Option<&str> {
        self.by_key
            .get(&(code.to_string(), name.to_string()))
            .map(|&i| self.entries[i].short_name.as_str())
    }

    /// Position of a short label in the declared order (first occurrence).
    pub fn rank(&self, short_name: &str) -> Option<usize> {
        self.order.get(short_name).copied()
    }
}

/// One row of a [`WideTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub month: CanonicalMonth,
    /// Values aligned with [`WideTable::labels`].
    pub values: Vec<Option<f64>>,
}

/// One row per month, one column per short label.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    /// Ordered series labels (excluding the two key columns).
    pub labels: Vec<String>,
    /// Rows in ascending month order.
    pub rows: Vec<WideRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_month_pins_to_last_day() {
        let feb_leap = CanonicalMonth::from_ymd(2024, 2).unwrap();
        assert_eq!(feb_leap.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let dec = CanonicalMonth::from_ymd(2022, 12).unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
        assert_eq!(CanonicalMonth::from_ymd(2022, 13), None);
    }

    #[test]
    fn canonical_month_displays_first_of_month_and_label() {
        let m = CanonicalMonth::containing(NaiveDate::from_ymd_opt(2023, 1, 17).unwrap());
        assert_eq!(m.to_string(), "2023-01-01");
        assert_eq!(m.label(), "January 2023");
    }

    #[test]
    fn grid_reads_outside_bounds_as_empty() {
        let grid = SheetGrid::new("s", vec![vec![Cell::Int(1)], vec![Cell::Empty, Cell::Text("x".into())]]);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.cell(0, 1), &Cell::Empty);
        assert_eq!(grid.cell(9, 9), &Cell::Empty);
        assert_eq!(grid.cell(1, 1).as_text(), Some("x"));
    }

    #[test]
    fn cell_numeric_coercion() {
        assert_eq!(Cell::Float(101.5).to_number(), Some(101.5));
        assert_eq!(Cell::Int(3).to_number(), Some(3.0));
        assert_eq!(Cell::Text(" 2.5 ".into()).to_number(), Some(2.5));
        assert_eq!(Cell::Text("-".into()).to_number(), None);
        assert_eq!(Cell::Bool(true).to_number(), None);
        assert_eq!(Cell::Empty.to_number(), None);
    }

    #[test]
    fn curation_mapping_first_entry_wins_and_ranks_labels() {
        let mapping = CurationMapping::new(vec![
            CurationEntry::new("0999", "Consumer Price Index", "All items"),
            CurationEntry::new("01", "Food", "Food"),
            CurationEntry::new("01", "Food", "Duplicate"),
        ]);
        assert_eq!(mapping.short_name("01", "Food"), Some("Food"));
        assert_eq!(mapping.short_name("01", "food"), None);
        assert_eq!(mapping.rank("All items"), Some(0));
        assert_eq!(mapping.rank("Duplicate"), Some(2));
    }
}
