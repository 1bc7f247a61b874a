//! End-to-end run: workbook → long tables → curated tables → wide tables → CSV files.
//!
//! [`build_outputs`] does all the in-memory work; [`run`] additionally publishes the five
//! output files. Structural errors (missing sheet, missing column, duplicate wide cell, I/O)
//! stop the run before anything is written.

mod observability;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::ingestion::csv::load_curation_mapping;
use crate::ingestion::excel::Workbook;
use crate::layout::extract_long_records;
use crate::output::{
    self, long_divisions_table, long_foods_table, long_groups_table, wide_table, OutputBundle, LONG_DIVISIONS_FILE,
    LONG_FOODS_FILE, LONG_GROUPS_FILE, WIDE_FOODS_FILE, WIDE_GROUPS_FILE,
};
use crate::processing::{curate_major_foods, curate_major_groups, pivot_wide, select_major_foods};
use crate::types::{CanonicalMonth, CuratedRecord, LongRecord, WideTable};

pub use observability::{
    CompositeObserver, EventLine, FileObserver, PipelineObserver, PipelineSeverity, Stage, StageContext,
    StageStats, StdErrObserver, TracingObserver,
};

/// Options controlling observation of a run.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct PipelineOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn PipelineObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: PipelineSeverity,
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: PipelineSeverity::Critical,
        }
    }
}

/// All tables produced by one run, before serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutputs {
    pub major_divisions: Vec<LongRecord>,
    pub major_groups: Vec<CuratedRecord>,
    pub major_foods: Vec<CuratedRecord>,
    pub wide_groups: WideTable,
    pub wide_foods: WideTable,
}

impl PipelineOutputs {
    /// Render the five output tables under their file names.
    pub fn to_bundle(&self) -> OutputBundle {
        let mut bundle = OutputBundle::default();
        bundle.push(LONG_DIVISIONS_FILE, long_divisions_table(&self.major_divisions));
        bundle.push(LONG_GROUPS_FILE, long_groups_table(&self.major_groups));
        bundle.push(LONG_FOODS_FILE, long_foods_table(&self.major_foods));
        bundle.push(WIDE_GROUPS_FILE, wide_table(&self.wide_groups));
        bundle.push(WIDE_FOODS_FILE, wide_table(&self.wide_foods));
        bundle
    }

    /// Earliest and latest month across the extracted divisions and groups.
    pub fn month_range(&self) -> Option<(CanonicalMonth, CanonicalMonth)> {
        let months = self
            .major_divisions
            .iter()
            .map(|r| r.month)
            .chain(self.major_groups.iter().map(|c| c.record.month));
        months.fold(None, |acc, m| match acc {
            None => Some((m, m)),
            Some((lo, hi)) => Some((lo.min(m), hi.max(m))),
        })
    }
}

/// What a completed run wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Written files with their data row counts.
    pub files: Vec<(PathBuf, usize)>,
    pub month_range: Option<(CanonicalMonth, CanonicalMonth)>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.month_range {
            Some((lo, hi)) => writeln!(f, "months: {} .. {}", lo.label(), hi.label())?,
            None => writeln!(f, "months: none")?,
        }
        for (path, rows) in &self.files {
            writeln!(f, "{} ({rows} rows)", path.display())?;
        }
        Ok(())
    }
}

/// Extract, curate and reshape everything in memory.
pub fn build_outputs(config: &PipelineConfig, options: &PipelineOptions) -> PipelineResult<PipelineOutputs> {
    let workbook_path = config.workbook_path.as_path();
    let mut workbook = observed(
        options,
        Stage::OpenWorkbook,
        workbook_path,
        || Workbook::open(workbook_path),
        |wb| wb.sheet_names().len(),
    )?;

    let groups = observed(
        options,
        Stage::ExtractMajorGroups,
        workbook_path,
        || {
            let grid = workbook.sheet(&config.major_groups.sheet_name)?;
            extract_long_records(&grid, &config.major_groups)
        },
        |records| records.len(),
    )?;
    let divisions = observed(
        options,
        Stage::ExtractMajorDivisions,
        workbook_path,
        || {
            let grid = workbook.sheet(&config.major_division.sheet_name)?;
            extract_long_records(&grid, &config.major_division)
        },
        |records| records.len(),
    )?;

    let groups_mapping = observed(
        options,
        Stage::LoadGroupsMapping,
        &config.groups_mapping_path,
        || load_curation_mapping(&config.groups_mapping_path, &config.groups_columns),
        |m| m.entries().len(),
    )?;
    let foods_mapping = observed(
        options,
        Stage::LoadFoodsMapping,
        &config.foods_mapping_path,
        || load_curation_mapping(&config.foods_mapping_path, &config.foods_columns),
        |m| m.entries().len(),
    )?;

    let major_groups = observed(
        options,
        Stage::CurateMajorGroups,
        &config.groups_mapping_path,
        || Ok(curate_major_groups(&groups, &groups_mapping)),
        |records| records.len(),
    )?;
    let major_foods = observed(
        options,
        Stage::CurateMajorFoods,
        &config.foods_mapping_path,
        || {
            let selected = select_major_foods(&divisions, &groups, &config.food_selection);
            Ok(curate_major_foods(&selected, &foods_mapping))
        },
        |records| records.len(),
    )?;

    let wide_groups = observed(
        options,
        Stage::WideMajorGroups,
        &config.output_dir,
        || pivot_wide(&major_groups, &config.wide_groups),
        |w| w.rows.len(),
    )?;
    let wide_foods = observed(
        options,
        Stage::WideMajorFoods,
        &config.output_dir,
        || pivot_wide(&major_foods, &config.wide_foods),
        |w| w.rows.len(),
    )?;

    Ok(PipelineOutputs {
        major_divisions: divisions,
        major_groups,
        major_foods,
        wide_groups,
        wide_foods,
    })
}

/// Run the whole pipeline and write the five output files into `config.output_dir`.
///
/// Either all files are written or none are.
///
/// ```no_run
/// use std::sync::Arc;
///
/// use gaza_cpi::config::PipelineConfig;
/// use gaza_cpi::pipeline::{run, PipelineOptions, TracingObserver};
///
/// # fn main() -> Result<(), gaza_cpi::PipelineError> {
/// let options = PipelineOptions {
///     observer: Some(Arc::new(TracingObserver)),
///     ..Default::default()
/// };
/// let summary = run(&PipelineConfig::default(), &options)?;
/// print!("{summary}");
/// # Ok(())
/// # }
/// ```
pub fn run(config: &PipelineConfig, options: &PipelineOptions) -> PipelineResult<RunSummary> {
    let outputs = build_outputs(config, options)?;
    let bundle = outputs.to_bundle();

    let written = observed(
        options,
        Stage::WriteOutputs,
        &config.output_dir,
        || output::write_bundle(&config.output_dir, &bundle),
        |paths| paths.len(),
    )?;

    let summary = RunSummary {
        files: written
            .into_iter()
            .zip(bundle.files.iter().map(|(_, t)| t.row_count()))
            .collect(),
        month_range: outputs.month_range(),
    };
    info!(files = summary.files.len(), "run complete");
    Ok(summary)
}

/// Run one stage and report its outcome to the configured observer.
fn observed<T>(
    options: &PipelineOptions,
    stage: Stage,
    path: &Path,
    f: impl FnOnce() -> PipelineResult<T>,
    rows: impl FnOnce(&T) -> usize,
) -> PipelineResult<T> {
    let result = f();

    if let Some(obs) = options.observer.as_ref() {
        let ctx = StageContext {
            stage,
            path: path.to_path_buf(),
        };
        match &result {
            Ok(value) => obs.on_stage(&ctx, StageStats { rows: rows(value) }),
            Err(e) => {
                let sev = PipelineSeverity::of(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}
