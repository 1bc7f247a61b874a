use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by extraction, curation, reshaping, and output functions.
///
/// Per-cell problems (non-numeric values, unmapped categories) never surface here; they
/// degrade to missing values. Everything in this enum is fatal except
/// [`PipelineError::UnparseableMonth`], which the column scanner recovers from locally.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A header/date cell could not be resolved to a calendar month.
    #[error("unparseable month token '{raw}'")]
    UnparseableMonth { raw: String },

    /// No column of the sheet could be mapped to a month.
    #[error("sheet '{sheet}': no month columns found")]
    NoMonthColumns { sheet: String },

    /// The workbook does not contain the expected sheet (names are matched exactly).
    #[error("missing sheet '{sheet}'. available={available:?}")]
    MissingSheet { sheet: String, available: Vec<String> },

    /// A required column is absent from a sheet layout or a curation table.
    #[error("{context}: missing required column '{column}'")]
    MissingColumn { context: String, column: String },

    /// A sheet is too short for the row positions its layout declares.
    #[error("sheet '{sheet}': missing {role} row {row}")]
    MissingRow {
        sheet: String,
        row: usize,
        role: &'static str,
    },

    /// Two records landed on the same cell of a wide table.
    #[error("duplicate value for '{label}' at {month} while pivoting")]
    PivotConflict { label: String, month: String },

    /// I/O failure on a workbook, mapping table, or output file.
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Workbook could not be opened or decoded.
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Curation table could not be read or an output table could not be written.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid configuration file.
    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
