//! Delimited output tables and all-or-nothing publication.
//!
//! Each curated or wide table is first rendered into a plain [`Table`] of strings. An
//! [`OutputBundle`] collects the five tables of a run; [`write_bundle`] stages every file in a
//! temporary file next to its destination and renames them into place only once all of them
//! were written.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempPath};
use tracing::{info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{CuratedRecord, LongRecord, WideTable};

pub const LONG_DIVISIONS_FILE: &str = "long_cpi_gaza_strip_major_divisions.csv";
pub const LONG_GROUPS_FILE: &str = "long_cpi_gaza_strip_major_groups.csv";
pub const LONG_FOODS_FILE: &str = "long_cpi_gaza_strip_major_foods.csv";
pub const WIDE_GROUPS_FILE: &str = "wide_cpi_gaza_strip_major_groups.csv";
pub const WIDE_FOODS_FILE: &str = "wide_cpi_gaza_strip_major_foods.csv";

/// A header row plus string rows, ready for a delimited writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a header, if present.
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

/// Long table for the major divisions:
/// `code_good_service, name_good_service, date_month, cpi_index, pct_change`.
pub fn long_divisions_table(records: &[LongRecord]) -> Table {
    let mut table = Table::new(["code_good_service", "name_good_service", "date_month", "cpi_index", "pct_change"]);
    for r in records {
        table.rows.push(vec![
            r.code.clone(),
            r.name.clone(),
            r.month.to_string(),
            format_value(r.index_value),
            format_value(r.pct_change),
        ]);
    }
    table
}

/// Long table for the major groups, with the short label after the name.
pub fn long_groups_table(records: &[CuratedRecord]) -> Table {
    let mut table = Table::new([
        "code_good_service",
        "name_good_service",
        "short_name_good_service",
        "date_month",
        "cpi_index",
        "pct_change",
    ]);
    for c in records {
        let r = &c.record;
        table.rows.push(vec![
            r.code.clone(),
            r.name.clone(),
            c.short_name.clone().unwrap_or_default(),
            r.month.to_string(),
            format_value(r.index_value),
            format_value(r.pct_change),
        ]);
    }
    table
}

/// Long table for the major foods: name first, unmatched short labels left empty.
pub fn long_foods_table(records: &[CuratedRecord]) -> Table {
    let mut table = Table::new(["name_food", "short_name_food", "code_food", "date_month", "cpi_index", "pct_change"]);
    for c in records {
        let r = &c.record;
        table.rows.push(vec![
            r.name.clone(),
            c.short_name.clone().unwrap_or_default(),
            r.code.clone(),
            r.month.to_string(),
            format_value(r.index_value),
            format_value(r.pct_change),
        ]);
    }
    table
}

/// Wide table: `date_month, date_label`, then one column per label in order.
pub fn wide_table(wide: &WideTable) -> Table {
    let mut headers = vec!["date_month".to_string(), "date_label".to_string()];
    headers.extend(wide.labels.iter().cloned());
    let mut table = Table::new(headers);
    for row in &wide.rows {
        let mut out = Vec::with_capacity(row.values.len() + 2);
        out.push(row.month.to_string());
        out.push(row.month.label());
        out.extend(row.values.iter().map(|v| format_value(*v)));
        table.rows.push(out);
    }
    table
}

/// Format a numeric cell. Missing values are empty; whole numbers keep one decimal (`100.0`).
pub fn format_value(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{v:.1}"),
        Some(v) => v.to_string(),
    }
}

/// The named tables of one run, in publication order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBundle {
    pub files: Vec<(String, Table)>,
}

impl OutputBundle {
    pub fn push(&mut self, file_name: impl Into<String>, table: Table) {
        self.files.push((file_name.into(), table));
    }

    pub fn get(&self, file_name: &str) -> Option<&Table> {
        self.files
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, t)| t)
    }
}

/// Write one table as CSV.
pub fn write_table<W: Write>(writer: W, table: &Table) -> PipelineResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush().map_err(|e| PipelineError::Csv(e.into()))?;
    Ok(())
}

/// Write every table of `bundle` into `dir`, all or nothing.
///
/// Tables are rendered into temporary files inside `dir` first; if any of them fails, the
/// temporaries are removed and no destination file is touched. Existing destination files are
/// then moved aside, and the staged files are renamed into place. If a rename fails, the files
/// already published are removed and the previous files restored. Returns the written paths.
pub fn write_bundle(dir: impl AsRef<Path>, bundle: &OutputBundle) -> PipelineResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;

    let mut staged: Vec<(NamedTempFile, PathBuf)> = Vec::with_capacity(bundle.files.len());
    for (file_name, table) in &bundle.files {
        let target = dir.join(file_name);
        let mut tmp = tempfile::Builder::new()
            .prefix(".cpi-")
            .suffix(".csv.tmp")
            .tempfile_in(dir)
            .map_err(|e| PipelineError::io(&target, e))?;
        write_table(tmp.as_file_mut(), table)?;
        tmp.as_file().sync_all().map_err(|e| PipelineError::io(&target, e))?;
        staged.push((tmp, target));
    }

    let mut backups: Vec<(PathBuf, TempPath)> = Vec::new();
    for (_, target) in &staged {
        if !target.is_file() {
            continue;
        }
        match back_up(dir, target) {
            Ok(backup) => backups.push((target.clone(), backup)),
            Err(err) => {
                roll_back(&[], backups);
                return Err(err);
            }
        }
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (tmp, target) in staged {
        if let Err(e) = tmp.persist(&target) {
            roll_back(&written, backups);
            return Err(PipelineError::io(&target, e.error));
        }
        written.push(target);
    }

    for path in &written {
        info!(path = %path.display(), "wrote output");
    }
    // Dropping the backups deletes the previous files.
    drop(backups);
    Ok(written)
}

/// Move an existing destination file to a temporary path in `dir`.
fn back_up(dir: &Path, target: &Path) -> PipelineResult<TempPath> {
    let backup = tempfile::Builder::new()
        .prefix(".cpi-")
        .suffix(".csv.bak")
        .tempfile_in(dir)
        .map_err(|e| PipelineError::io(target, e))?
        .into_temp_path();
    fs::rename(target, &backup).map_err(|e| PipelineError::io(target, e))?;
    Ok(backup)
}

/// Undo a partial publication: remove `published` and move every backup to its destination.
fn roll_back(published: &[PathBuf], backups: Vec<(PathBuf, TempPath)>) {
    for path in published {
        if let Err(e) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "could not remove partially published output");
        }
    }
    for (target, backup) in backups {
        if let Err(e) = fs::rename(&backup, &target) {
            // Keep the backup on disk so the previous output is not lost.
            let kept = backup.keep().ok();
            warn!(
                path = %target.display(),
                backup = ?kept,
                error = %e,
                "could not restore previous output"
            );
        }
    }
}
