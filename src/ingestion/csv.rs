//! Curation table ingestion.

use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{CurationEntry, CurationMapping};

/// Default file name of the major-groups curation table.
pub const GROUPS_MAPPING_FILE: &str = "cpi_groups_names_codes.csv";

/// Default file name of the major-foods curation table.
pub const FOODS_MAPPING_FILE: &str = "cpi_food_names_codes.csv";

/// Header names of the (code, name, short name) columns in a curation table.
///
/// Names are matched exactly, including case and surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurationColumns {
    pub code: String,
    pub name: String,
    pub short_name: String,
}

impl CurationColumns {
    pub fn groups() -> Self {
        Self {
            code: "code_good_service".to_string(),
            name: "name_good_service".to_string(),
            short_name: "short_name_good_service".to_string(),
        }
    }

    pub fn foods() -> Self {
        Self {
            code: "code_food".to_string(),
            name: "name_food".to_string(),
            short_name: "short_name_food".to_string(),
        }
    }
}

/// Load a curation table from a CSV file.
///
/// Rules:
///
/// - CSV must have headers containing all three `columns` (order can differ, extra columns are
///   ignored).
/// - Values are kept as text, so codes such as `01` keep their leading zero.
/// - Row order defines the presentation order of short labels.
/// - Rows with a blank short name are skipped.
pub fn load_curation_mapping(path: impl AsRef<Path>, columns: &CurationColumns) -> PipelineResult<CurationMapping> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(file);
    read_curation_mapping(&mut rdr, columns).map_err(|e| match e {
        PipelineError::MissingColumn { context, column } => PipelineError::MissingColumn {
            context: format!("{} {context}", path.display()),
            column,
        },
        other => other,
    })
}

/// Read a curation table from an existing CSV reader.
pub fn read_curation_mapping<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    columns: &CurationColumns,
) -> PipelineResult<CurationMapping> {
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let position = |wanted: &str| {
        headers
            .iter()
            .position(|h| h == wanted)
            .ok_or_else(|| PipelineError::MissingColumn {
                context: format!("curation table (headers={headers:?})"),
                column: wanted.to_string(),
            })
    };
    let code_idx = position(columns.code.as_str())?;
    let name_idx = position(columns.name.as_str())?;
    let short_idx = position(columns.short_name.as_str())?;

    let mut entries = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        let record = result?;
        let short_name = record.get(short_idx).unwrap_or("");
        if short_name.trim().is_empty() {
            // +2: 1-based, after the header row.
            debug!(row = row_idx0 + 2, "curation row without short name skipped");
            continue;
        }
        entries.push(CurationEntry::new(
            record.get(code_idx).unwrap_or(""),
            record.get(name_idx).unwrap_or(""),
            short_name,
        ));
    }

    Ok(CurationMapping::new(entries))
}
