#![allow(dead_code)]

use std::path::{Path, PathBuf};

use gaza_cpi::config::PipelineConfig;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};

pub const GROUPS_SHEET: &str = "cpi - by Major Groups ";
pub const DIVISION_SHEET: &str = "cpi - data by major division ";

/// One sheet row: code, name, then (index, pct) per month. `None` leaves the cell blank.
type Row<'a> = (&'a str, &'a str, [(Option<f64>, Option<f64>); 2]);

const GROUP_ROWS: &[Row] = &[
    ("0999", "All items", [(Some(150.0), Some(1.0)), (Some(152.0), Some(1.3))]),
    ("01", "Food and non-alcoholic beverages", [(Some(200.0), Some(2.0)), (Some(210.0), Some(5.0))]),
    ("02", "Alcoholic beverages and tobacco", [(Some(300.0), None), (Some(310.0), None)]),
    ("03", "Clothing and footwear", [(Some(120.0), Some(0.5)), (Some(125.0), Some(4.17))]),
    ("04", "Housing", [(Some(130.0), Some(0.0)), (Some(128.0), Some(-1.54))]),
    ("12", "Financial services", [(Some(110.0), None), (Some(111.0), None)]),
    ("13", "Personal care", [(Some(115.0), None), (Some(116.0), None)]),
    ("12+13", "Miscellaneous goods and services", [(Some(112.0), None), (Some(113.0), None)]),
];

const DIVISION_ROWS: &[Row] = &[
    ("0999", "All items", [(Some(150.0), Some(1.0)), (Some(152.0), Some(1.3))]),
    ("01", "Food and non-alcoholic beverages", [(Some(200.0), None), (Some(210.0), None)]),
    ("011", "Food", [(Some(201.0), None), (Some(211.0), None)]),
    ("0111", "Bread and cereals", [(Some(180.0), Some(1.5)), (Some(190.0), Some(5.56))]),
    ("0112", "Meat", [(Some(220.0), None), (Some(230.0), None)]),
    ("0113", "Fish and seafood", [(None, None), (Some(175.0), None)]),
    ("0119", "Other food products", [(Some(150.0), None), (Some(160.0), None)]),
];

/// Write a two-sheet workbook shaped like the PCBS release (December 2022 and January 2023).
///
/// The major-groups sheet labels months with text on the marker row; the major-division sheet
/// has `Index` / `%` markers on row 3 and date cells on row 4.
pub fn write_cpi_workbook(path: &Path) {
    let mut wb = Workbook::new();

    let groups = wb.add_worksheet();
    groups.set_name(GROUPS_SHEET).unwrap();
    groups.write_string(0, 0, "Consumer Price Index by Major Groups").unwrap();
    groups.write_string(5, 0, "Code").unwrap();
    groups.write_string(5, 2, "Major group").unwrap();
    groups.write_string(5, 3, "Dec.2022").unwrap();
    groups.write_string(5, 4, "% change").unwrap();
    groups.write_string(5, 5, "Jan  2023").unwrap();
    groups.write_string(5, 6, "% change").unwrap();
    write_rows(groups, 6, GROUP_ROWS);

    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let division = wb.add_worksheet();
    division.set_name(DIVISION_SHEET).unwrap();
    division.write_string(0, 0, "Consumer Price Index by Major Division").unwrap();
    division.write_string(2, 3, "Index").unwrap();
    division.write_string(2, 4, "%").unwrap();
    division.write_string(2, 5, "Index").unwrap();
    division.write_string(2, 6, "%").unwrap();
    let dec = ExcelDateTime::from_ymd(2022, 12, 31).unwrap();
    let jan = ExcelDateTime::from_ymd(2023, 1, 15).unwrap();
    division.write_datetime_with_format(3, 3, &dec, &date_format).unwrap();
    division.write_datetime_with_format(3, 5, &jan, &date_format).unwrap();
    write_rows(division, 4, DIVISION_ROWS);
    let footnote_row = 4 + DIVISION_ROWS.len() as u32;
    division.write_string(footnote_row, 2, "Base year 2018 = 100").unwrap();

    wb.save(path).unwrap();
}

fn write_rows(ws: &mut Worksheet, first_row: u32, rows: &[Row]) {
    for (i, (code, name, months)) in rows.iter().enumerate() {
        let row = first_row + i as u32;
        ws.write_string(row, 0, *code).unwrap();
        ws.write_string(row, 2, *name).unwrap();
        for (m, (index, pct)) in months.iter().enumerate() {
            let col = 3 + 2 * m as u16;
            match index {
                Some(v) => ws.write_number(row, col, *v).unwrap(),
                None => ws.write_string(row, col, "..").unwrap(),
            };
            if let Some(p) = pct {
                ws.write_number(row, col + 1, *p).unwrap();
            }
        }
    }
}

/// A config pointing at a freshly written workbook in `dir` and the checked-in curation tables.
pub fn fixture_config(dir: &Path) -> PipelineConfig {
    let workbook = dir.join("consumer-price-index.xlsx");
    write_cpi_workbook(&workbook);
    PipelineConfig {
        workbook_path: workbook,
        output_dir: dir.join("output_data"),
        ..PipelineConfig::default()
    }
    .with_extras_dir(fixtures_dir())
}

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}
