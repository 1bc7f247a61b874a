//! Run configuration.
//!
//! [`PipelineConfig::default`] carries the production layout of the PCBS workbook. A JSON file
//! can override any subset of fields (missing fields keep their defaults):
//!
//! ```json
//! {
//!   "workbook_path": "input_data/consumer-price-index.xlsx",
//!   "major_division": {
//!     "sheet_name": "cpi - data by major division ",
//!     "code_col": 0, "name_col": 2, "header_row": 2, "date_row": 3, "data_start_row": 4
//!   }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::ingestion::csv::{CurationColumns, FOODS_MAPPING_FILE, GROUPS_MAPPING_FILE};
use crate::layout::SheetLayout;
use crate::processing::{FoodSelection, WideLayout};

/// Everything a run needs: input/output locations, sheet layouts and presentation presets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub workbook_path: PathBuf,
    pub groups_mapping_path: PathBuf,
    pub foods_mapping_path: PathBuf,
    pub output_dir: PathBuf,
    pub major_groups: SheetLayout,
    pub major_division: SheetLayout,
    pub groups_columns: CurationColumns,
    pub foods_columns: CurationColumns,
    pub food_selection: FoodSelection,
    pub wide_groups: WideLayout,
    pub wide_foods: WideLayout,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let extras = Path::new("extras");
        Self {
            workbook_path: PathBuf::from("input_data/consumer-price-index.xlsx"),
            groups_mapping_path: extras.join(GROUPS_MAPPING_FILE),
            foods_mapping_path: extras.join(FOODS_MAPPING_FILE),
            output_dir: PathBuf::from("output_data"),
            major_groups: SheetLayout::major_groups(),
            major_division: SheetLayout::major_division(),
            groups_columns: CurationColumns::groups(),
            foods_columns: CurationColumns::foods(),
            food_selection: FoodSelection::default(),
            wide_groups: WideLayout::major_groups(),
            wide_foods: WideLayout::major_foods(),
        }
    }
}

impl PipelineConfig {
    /// Load overrides from a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        serde_json::from_str(&raw).map_err(|e| PipelineError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Point both curation tables at their default file names inside `dir`.
    pub fn with_extras_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.groups_mapping_path = dir.join(GROUPS_MAPPING_FILE);
        self.foods_mapping_path = dir.join(FOODS_MAPPING_FILE);
        self
    }
}
