//! Spreadsheet-layout parsing.
//!
//! The CPI workbook is formatted for people: merged titles, months as column groups, index and
//! percent-change columns interleaved with irregular spacing. This module recovers a reliable
//! structure from it:
//!
//! - [`month`]: turns a header/date cell into a [`crate::types::CanonicalMonth`]
//! - [`scanner`]: maps each month to its index column and optional percent column
//! - [`extract`]: combines the column map with the code/name columns into long-format records

pub mod extract;
pub mod month;
pub mod scanner;

pub use extract::{extract_long_records, normalize_code, SheetLayout, MAJOR_DIVISION_SHEET, MAJOR_GROUPS_SHEET};
pub use month::{normalize_month, parse_month_str};
pub use scanner::build_month_map;
