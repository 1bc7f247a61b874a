mod common;

use gaza_cpi::ingestion::excel::{load_sheet_grid, Workbook};
use gaza_cpi::layout::{build_month_map, extract_long_records, SheetLayout};
use gaza_cpi::types::{CanonicalMonth, Cell};
use gaza_cpi::PipelineError;

use common::{write_cpi_workbook, DIVISION_SHEET, GROUPS_SHEET};

fn month(y: i32, m: u32) -> CanonicalMonth {
    CanonicalMonth::from_ymd(y, m).unwrap()
}

fn workbook_in(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("cpi.xlsx");
    write_cpi_workbook(&path);
    path
}

#[test]
fn sheet_names_keep_trailing_spaces() {
    let dir = tempfile::tempdir().unwrap();
    let wb = Workbook::open(workbook_in(&dir)).unwrap();
    assert_eq!(wb.sheet_names(), vec![GROUPS_SHEET.to_string(), DIVISION_SHEET.to_string()]);
}

#[test]
fn sheet_lookup_is_exact() {
    let dir = tempfile::tempdir().unwrap();
    let mut wb = Workbook::open(workbook_in(&dir)).unwrap();

    let err = wb.sheet(GROUPS_SHEET.trim_end()).unwrap_err();
    assert!(matches!(err, PipelineError::MissingSheet { .. }));
    assert!(err.to_string().contains("missing sheet 'cpi - by Major Groups'"));
    assert!(err.to_string().contains("available="));
}

#[test]
fn date_cells_are_read_as_dates() {
    let dir = tempfile::tempdir().unwrap();
    let grid = load_sheet_grid(workbook_in(&dir), DIVISION_SHEET).unwrap();

    assert!(matches!(grid.cell(3, 3), Cell::DateTime(_)));
    assert_eq!(grid.cell(2, 3).as_text(), Some("Index"));
    assert_eq!(grid.cell(4, 0).as_text(), Some("0999"));
}

#[test]
fn division_months_come_from_date_row() {
    let dir = tempfile::tempdir().unwrap();
    let grid = load_sheet_grid(workbook_in(&dir), DIVISION_SHEET).unwrap();

    let map = build_month_map(&grid, 2, 3, 3);
    assert_eq!(map.len(), 2);
    assert_eq!(map[0].month, month(2022, 12));
    assert_eq!((map[0].index_col, map[0].pct_col), (3, Some(4)));
    // A mid-month date still lands on January.
    assert_eq!(map[1].month, month(2023, 1));
    assert_eq!((map[1].index_col, map[1].pct_col), (5, Some(6)));
}

#[test]
fn extract_major_groups_from_text_month_labels() {
    let dir = tempfile::tempdir().unwrap();
    let grid = load_sheet_grid(workbook_in(&dir), GROUPS_SHEET).unwrap();

    let records = extract_long_records(&grid, &SheetLayout::major_groups()).unwrap();
    assert_eq!(records.len(), 16);

    let first = &records[0];
    assert_eq!(first.code, "01");
    assert_eq!(first.name, "Food and non-alcoholic beverages");
    assert_eq!(first.month, month(2022, 12));
    assert_eq!(first.index_value, Some(200.0));
    assert_eq!(first.pct_change, Some(2.0));

    let misc_jan = records
        .iter()
        .find(|r| r.code == "12+13" && r.month == month(2023, 1))
        .unwrap();
    assert_eq!(misc_jan.index_value, Some(113.0));
    assert_eq!(misc_jan.pct_change, None);
}

#[test]
fn extract_major_division_drops_footnotes_and_coerces_values() {
    let dir = tempfile::tempdir().unwrap();
    let grid = load_sheet_grid(workbook_in(&dir), DIVISION_SHEET).unwrap();

    let records = extract_long_records(&grid, &SheetLayout::major_division()).unwrap();
    assert_eq!(records.len(), 14);

    let codes: Vec<&str> = records.iter().step_by(2).map(|r| r.code.as_str()).collect();
    assert_eq!(codes, vec!["01", "011", "0111", "0112", "0113", "0119", "0999"]);

    let fish_dec = records
        .iter()
        .find(|r| r.code == "0113" && r.month == month(2022, 12))
        .unwrap();
    assert_eq!(fish_dec.index_value, None);
}

#[test]
fn wrong_layout_reports_missing_month_columns() {
    let dir = tempfile::tempdir().unwrap();
    let grid = load_sheet_grid(workbook_in(&dir), DIVISION_SHEET).unwrap();

    // Point the marker and date rows at data rows: no month can be found.
    let layout = SheetLayout {
        header_row: 5,
        date_row: 5,
        ..SheetLayout::major_division()
    };
    let err = extract_long_records(&grid, &layout).unwrap_err();
    assert!(matches!(err, PipelineError::NoMonthColumns { .. }));
}
