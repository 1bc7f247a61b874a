//! Workbook ingestion via `calamine`.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{Cell, SheetGrid};

/// A read-only workbook (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`).
pub struct Workbook {
    path: PathBuf,
    sheets: Sheets<BufReader<File>>,
}

impl std::fmt::Debug for Workbook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbook").field("path", &self.path).finish()
    }
}

impl Workbook {
    /// Open a workbook. A missing or unreadable file is reported with its path.
    pub fn open(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        // Calamine wraps I/O failures per format; open the file first so the path is reported uniformly.
        File::open(path).map_err(|e| PipelineError::io(path, e))?;
        let sheets = open_workbook_auto(path).map_err(|e| match e {
            calamine::Error::Io(source) => PipelineError::io(path, source),
            other => PipelineError::Excel(other),
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// Load a sheet by exact name (trailing spaces are significant).
    ///
    /// Returns [`PipelineError::MissingSheet`] if the name does not match any sheet.
    pub fn sheet(&mut self, name: &str) -> PipelineResult<SheetGrid> {
        let available = self.sheet_names();
        if !available.iter().any(|s| s == name) {
            return Err(PipelineError::MissingSheet {
                sheet: name.to_string(),
                available,
            });
        }
        let range = self.sheets.worksheet_range(name)?;
        Ok(range_to_grid(name, &range))
    }
}

/// Open `path` and load a single sheet.
pub fn load_sheet_grid(path: impl AsRef<Path>, sheet_name: &str) -> PipelineResult<SheetGrid> {
    Workbook::open(path)?.sheet(sheet_name)
}

/// Convert a calamine range into a grid addressed from `A1`.
///
/// Calamine ranges start at the first used cell; the leading rows/columns are padded back so
/// layout positions stay absolute.
pub fn range_to_grid(name: &str, range: &Range<Data>) -> SheetGrid {
    let Some((row0, col0)) = range.start() else {
        return SheetGrid::new(name, Vec::new());
    };

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row0 as usize];
    for row in range.rows() {
        let mut out = vec![Cell::Empty; col0 as usize];
        out.extend(row.iter().map(convert_cell));
        rows.push(out);
    }
    SheetGrid::new(name, rows)
}

fn convert_cell(c: &Data) -> Cell {
    match c {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                return Cell::Float(dt.as_f64());
            }
            dt.as_datetime()
                .map(Cell::DateTime)
                .unwrap_or_else(|| Cell::Float(dt.as_f64()))
        }
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Error(format!("{e:?}")),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
