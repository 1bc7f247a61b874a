//! Column discovery for month-per-column sheets.
//!
//! The CPI sheets lay months out left to right. Each month has an index column, identified by
//! an `Index` header or a date in the date row, optionally followed by a percent-change column
//! whose header contains `%`. Column spacing drifts between sheets and releases, so the scan
//! works from cell content rather than fixed offsets.

use tracing::debug;

use crate::types::{Cell, ColumnMapEntry, SheetGrid};

use super::month::normalize_month;

/// Header label marking an index column.
pub const INDEX_LABEL: &str = "index";

/// Marker identifying a percent-change header.
pub const PERCENT_MARKER: char = '%';

/// Scan `grid` from `first_data_col` and map every month to its index/percent columns.
///
/// `header_row` holds the `Index` / `%` labels; `date_row` holds the month labels and may be
/// the same row. Entries come back in left-to-right order and are not deduplicated. Columns
/// whose month cannot be parsed are skipped.
pub fn build_month_map(
    grid: &SheetGrid,
    header_row: usize,
    date_row: usize,
    first_data_col: usize,
) -> Vec<ColumnMapEntry> {
    let width = grid.width();
    let mut entries = Vec::new();
    let mut col = first_data_col;

    while col < width {
        let head = grid.cell(header_row, col);
        let date_cell = grid.cell(date_row, col);

        if !is_index_header(head) && date_cell.is_missing() {
            col += 1;
            continue;
        }

        let token = if date_cell.is_missing() { head } else { date_cell };
        let month = match normalize_month(token) {
            Ok(m) => m,
            Err(err) => {
                debug!(sheet = %grid.name, col, %err, "skipping column");
                col += 1;
                continue;
            }
        };

        let pct_col = (col + 1 < width && is_percent_header(grid.cell(header_row, col + 1))).then_some(col + 1);

        entries.push(ColumnMapEntry {
            month,
            index_col: col,
            pct_col,
        });
        col += if pct_col.is_some() { 2 } else { 1 };
    }

    entries
}

fn is_index_header(cell: &Cell) -> bool {
    cell.as_text()
        .is_some_and(|s| s.trim().eq_ignore_ascii_case(INDEX_LABEL))
}

fn is_percent_header(cell: &Cell) -> bool {
    cell.as_text().is_some_and(|s| s.contains(PERCENT_MARKER))
}
