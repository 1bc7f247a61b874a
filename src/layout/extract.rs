//! Sheet extraction: a [`SheetGrid`] plus a fixed [`SheetLayout`] become [`LongRecord`]s.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{Cell, LongRecord, SheetGrid};

use super::scanner::build_month_map;

/// Sheet holding the CPI by major groups (01-13, `12+13` and the overall `0999`).
pub const MAJOR_GROUPS_SHEET: &str = "cpi - by Major Groups ";

/// Sheet holding the CPI by major division (groups 01-07 broken down to leaf items).
pub const MAJOR_DIVISION_SHEET: &str = "cpi - data by major division ";

/// Fixed positions of a sheet's code/name columns and header/date/data rows (zero-based).
///
/// `sheet_name` is matched exactly, trailing spaces included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub sheet_name: String,
    pub code_col: usize,
    pub name_col: usize,
    /// Row with `Index` / `%` markers.
    pub header_row: usize,
    /// Row with month labels; may equal `header_row`.
    pub date_row: usize,
    pub data_start_row: usize,
}

impl SheetLayout {
    /// Layout of the major-groups sheet: months and `%` markers share row 6.
    pub fn major_groups() -> Self {
        Self {
            sheet_name: MAJOR_GROUPS_SHEET.to_string(),
            code_col: 0,
            name_col: 2,
            header_row: 5,
            date_row: 5,
            data_start_row: 6,
        }
    }

    /// Layout of the major-division sheet: markers on row 3, month timestamps on row 4.
    pub fn major_division() -> Self {
        Self {
            sheet_name: MAJOR_DIVISION_SHEET.to_string(),
            code_col: 0,
            name_col: 2,
            header_row: 2,
            date_row: 3,
            data_start_row: 4,
        }
    }

    /// First column that can hold month data.
    pub fn first_data_col(&self) -> usize {
        self.code_col.max(self.name_col) + 1
    }

    fn validate(&self, grid: &SheetGrid) -> PipelineResult<()> {
        for (col, column) in [(self.code_col, "code"), (self.name_col, "name")] {
            if col >= grid.width() {
                return Err(PipelineError::MissingColumn {
                    context: format!("sheet '{}'", self.sheet_name),
                    column: format!("{column} (column {col})"),
                });
            }
        }
        for (row, role) in [(self.header_row, "header"), (self.date_row, "date")] {
            if row >= grid.height() {
                return Err(PipelineError::MissingRow {
                    sheet: self.sheet_name.clone(),
                    row,
                    role,
                });
            }
        }
        Ok(())
    }
}

/// Extract long-format records from one sheet.
///
/// Produces one record per (data row, mapped month). Index and percent cells are coerced to
/// numbers; anything non-numeric becomes missing. Rows without a code are dropped, codes lose
/// any trailing `.0`, and the result is stably sorted by (code, month).
pub fn extract_long_records(grid: &SheetGrid, layout: &SheetLayout) -> PipelineResult<Vec<LongRecord>> {
    layout.validate(grid)?;

    let months = build_month_map(grid, layout.header_row, layout.date_row, layout.first_data_col());
    if months.is_empty() {
        return Err(PipelineError::NoMonthColumns {
            sheet: layout.sheet_name.clone(),
        });
    }

    let base: Vec<(usize, String, String)> = (layout.data_start_row..grid.height())
        .filter_map(|row| {
            let code = normalize_code(grid.cell(row, layout.code_col))?;
            let name = grid.cell(row, layout.name_col).to_plain_string();
            Some((row, code, name))
        })
        .collect();

    let mut records = Vec::with_capacity(months.len() * base.len());
    for entry in &months {
        for (row, code, name) in &base {
            records.push(LongRecord {
                code: code.clone(),
                name: name.clone(),
                month: entry.month,
                index_value: grid.cell(*row, entry.index_col).to_number(),
                pct_change: entry.pct_col.and_then(|c| grid.cell(*row, c).to_number()),
            });
        }
    }

    records.sort_by(|a, b| a.code.cmp(&b.code).then(a.month.cmp(&b.month)));

    info!(
        sheet = %layout.sheet_name,
        months = months.len(),
        categories = base.len(),
        records = records.len(),
        "extracted sheet"
    );
    Ok(records)
}

/// Stringify a code cell, dropping a float artifact such as `1.0` → `1`.
///
/// Returns `None` for blank codes.
pub fn normalize_code(cell: &Cell) -> Option<String> {
    if cell.is_missing() {
        return None;
    }
    let raw = cell.to_plain_string();
    if raw.trim().is_empty() {
        return None;
    }
    Some(match raw.strip_suffix(".0") {
        Some(stripped) => stripped.to_string(),
        None => raw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CanonicalMonth;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn layout() -> SheetLayout {
        SheetLayout {
            sheet_name: "division".to_string(),
            ..SheetLayout::major_division()
        }
    }

    /// Major-division shape: title rows, marker row, date row, then data.
    fn division_grid() -> SheetGrid {
        SheetGrid::new(
            "division",
            vec![
                vec![text("Consumer Price Index")],
                vec![],
                vec![Cell::Empty, Cell::Empty, Cell::Empty, text("Index"), text("%"), text("Index"), text("%")],
                vec![Cell::Empty, Cell::Empty, Cell::Empty, text("Jan 2023"), Cell::Empty, text("Dec.2022"), Cell::Empty],
                vec![text("0999"), Cell::Empty, text("All items"), Cell::Float(110.5), Cell::Float(1.2), Cell::Float(109.2), Cell::Float(0.4)],
                vec![Cell::Float(2.0), Cell::Empty, text("Numeric code"), text("-"), Cell::Empty, Cell::Int(98), text("n/a")],
                vec![Cell::Empty, Cell::Empty, text("Footnote")],
            ],
        )
    }

    #[test]
    fn extracts_sorted_long_records() {
        let records = extract_long_records(&division_grid(), &layout()).unwrap();
        assert_eq!(records.len(), 4);

        let dec = CanonicalMonth::from_ymd(2022, 12).unwrap();
        let jan = CanonicalMonth::from_ymd(2023, 1).unwrap();

        assert_eq!(records[0].code, "0999");
        assert_eq!(records[0].month, dec);
        assert_eq!(records[0].index_value, Some(109.2));
        assert_eq!(records[0].pct_change, Some(0.4));
        assert_eq!(records[1].month, jan);
        assert_eq!(records[1].index_value, Some(110.5));

        assert_eq!(records[2].code, "2");
        assert_eq!(records[2].name, "Numeric code");
        assert_eq!(records[2].month, dec);
        assert_eq!(records[2].index_value, Some(98.0));
        assert_eq!(records[2].pct_change, None);
        assert_eq!(records[3].index_value, None);
    }

    #[test]
    fn sheet_without_month_columns_is_an_error() {
        let grid = SheetGrid::new(
            "division",
            vec![vec![], vec![], vec![text("a"), text("b"), text("c"), text("Value")], vec![], vec![text("01")]],
        );
        let err = extract_long_records(&grid, &layout()).unwrap_err();
        assert!(matches!(err, PipelineError::NoMonthColumns { .. }));
    }

    #[test]
    fn narrow_sheet_is_missing_name_column() {
        let grid = SheetGrid::new("division", vec![vec![text("01")]; 5]);
        let err = extract_long_records(&grid, &layout()).unwrap_err();
        assert!(err.to_string().contains("missing required column 'name (column 2)'"));
    }

    #[test]
    fn short_sheet_is_missing_date_row() {
        let grid = SheetGrid::new("division", vec![vec![Cell::Empty; 5]; 3]);
        let err = extract_long_records(&grid, &layout()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingRow { role: "date", row: 3, .. }));
    }

    #[test]
    fn code_normalization() {
        assert_eq!(normalize_code(&Cell::Float(1.0)), Some("1".to_string()));
        assert_eq!(normalize_code(&text("12.0")), Some("12".to_string()));
        assert_eq!(normalize_code(&text("12+13")), Some("12+13".to_string()));
        assert_eq!(normalize_code(&text("0111")), Some("0111".to_string()));
        assert_eq!(normalize_code(&Cell::Empty), None);
        assert_eq!(normalize_code(&text("  ")), None);
    }
}
