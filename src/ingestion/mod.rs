//! Readers for the two input kinds.
//!
//! - [`excel`]: the PCBS workbook, loaded sheet by sheet into a [`crate::types::SheetGrid`]
//! - [`csv`]: the hand-maintained curation tables (code, name, short label)

pub mod csv;
pub mod excel;

pub use csv::{load_curation_mapping, read_curation_mapping, CurationColumns, FOODS_MAPPING_FILE, GROUPS_MAPPING_FILE};
pub use excel::{load_sheet_grid, range_to_grid, Workbook};
