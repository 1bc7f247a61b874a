use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};

use crate::error::PipelineError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (layout or schema violation; the run stops).
    Error,
    /// Critical error (I/O on the workbook, mapping tables or outputs).
    Critical,
}

impl PipelineSeverity {
    /// Severity of a fatal pipeline error.
    pub fn of(error: &PipelineError) -> Self {
        match error {
            PipelineError::Io { .. } => Self::Critical,
            PipelineError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            PipelineError::Excel(calamine::Error::Io(_)) => Self::Critical,
            PipelineError::UnparseableMonth { .. } => Self::Warning,
            PipelineError::Excel(_)
            | PipelineError::NoMonthColumns { .. }
            | PipelineError::MissingSheet { .. }
            | PipelineError::MissingColumn { .. }
            | PipelineError::MissingRow { .. }
            | PipelineError::PivotConflict { .. }
            | PipelineError::Config { .. } => Self::Error,
        }
    }
}

/// Pipeline stages reported to observers, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OpenWorkbook,
    ExtractMajorGroups,
    ExtractMajorDivisions,
    LoadGroupsMapping,
    LoadFoodsMapping,
    CurateMajorGroups,
    CurateMajorFoods,
    WideMajorGroups,
    WideMajorFoods,
    WriteOutputs,
}

/// Context about a stage.
#[derive(Debug, Clone)]
pub struct StageContext {
    pub stage: Stage,
    /// Input or output location the stage works on.
    pub path: PathBuf,
}

/// Minimal stats reported when a stage succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStats {
    /// Rows produced by the stage (records, mapping entries, or written rows).
    pub rows: usize,
}

/// Observer interface for pipeline outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait PipelineObserver: Send + Sync {
    /// Called when a stage succeeds.
    fn on_stage(&self, _ctx: &StageContext, _stats: StageStats) {}

    /// Called when a stage fails.
    fn on_failure(&self, _ctx: &StageContext, _severity: PipelineSeverity, _error: &PipelineError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &StageContext, severity: PipelineSeverity, error: &PipelineError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_stage(&self, ctx: &StageContext, stats: StageStats) {
        for o in &self.observers {
            o.on_stage(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &StageContext, severity: PipelineSeverity, error: &PipelineError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &StageContext, severity: PipelineSeverity, error: &PipelineError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_stage(&self, ctx: &StageContext, stats: StageStats) {
        tracing::info!(stage = ?ctx.stage, path = %ctx.path.display(), rows = stats.rows, "stage ok");
    }

    fn on_failure(&self, ctx: &StageContext, severity: PipelineSeverity, error: &PipelineError) {
        tracing::error!(stage = ?ctx.stage, ?severity, path = %ctx.path.display(), %error, "stage failed");
    }

    fn on_alert(&self, ctx: &StageContext, severity: PipelineSeverity, error: &PipelineError) {
        tracing::error!(alert = true, stage = ?ctx.stage, ?severity, path = %ctx.path.display(), %error, "stage failed");
    }
}

/// One observer event rendered as a single plain-text line.
///
/// Shared by [`StdErrObserver`] and [`FileObserver`] so both sinks read the same.
#[derive(Debug, Clone, Copy)]
pub enum EventLine<'a> {
    Ok {
        ctx: &'a StageContext,
        stats: StageStats,
    },
    Failed {
        ctx: &'a StageContext,
        severity: PipelineSeverity,
        error: &'a PipelineError,
        alert: bool,
    },
}

impl fmt::Display for EventLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok { ctx, stats } => write!(f, "{ctx} ok rows={}", stats.rows),
            Self::Failed {
                ctx,
                severity,
                error,
                alert,
            } => {
                let kind = if *alert { "ALERT" } else { "failed" };
                write!(f, "{ctx} {kind} severity={severity:?}: {error}")
            }
        }
    }
}

impl fmt::Display for StageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage={:?} path={}", self.stage, self.path.display())
    }
}

/// Prints one `[gaza-cpi]` line per event to stderr, independent of the log filter.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl StdErrObserver {
    fn emit(line: EventLine<'_>) {
        eprintln!("[gaza-cpi] {line}");
    }
}

impl PipelineObserver for StdErrObserver {
    fn on_stage(&self, ctx: &StageContext, stats: StageStats) {
        Self::emit(EventLine::Ok { ctx, stats });
    }

    fn on_failure(&self, ctx: &StageContext, severity: PipelineSeverity, error: &PipelineError) {
        Self::emit(EventLine::Failed {
            ctx,
            severity,
            error,
            alert: false,
        });
    }

    fn on_alert(&self, ctx: &StageContext, severity: PipelineSeverity, error: &PipelineError) {
        Self::emit(EventLine::Failed {
            ctx,
            severity,
            error,
            alert: true,
        });
    }
}

/// Appends timestamped events to a run log.
///
/// Writes are best-effort: a log that cannot be opened or written never fails the run.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, line: EventLine<'_>) {
        let _guard = self.lock.lock().ok();
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| writeln!(f, "{stamp} {line}"));
        if let Err(err) = written {
            tracing::warn!(path = %self.path.display(), %err, "could not append to event log");
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_stage(&self, ctx: &StageContext, stats: StageStats) {
        self.append(EventLine::Ok { ctx, stats });
    }

    fn on_failure(&self, ctx: &StageContext, severity: PipelineSeverity, error: &PipelineError) {
        self.append(EventLine::Failed {
            ctx,
            severity,
            error,
            alert: false,
        });
    }

    fn on_alert(&self, ctx: &StageContext, severity: PipelineSeverity, error: &PipelineError) {
        self.append(EventLine::Failed {
            ctx,
            severity,
            error,
            alert: true,
        });
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn mapping_ctx() -> StageContext {
        StageContext {
            stage: Stage::LoadGroupsMapping,
            path: PathBuf::from("extras/cpi_groups_names_codes.csv"),
        }
    }

    fn missing_code_column() -> PipelineError {
        PipelineError::MissingColumn {
            context: "curation table".to_string(),
            column: "code_good_service".to_string(),
        }
    }

    #[test]
    fn severity_mapping() {
        let io = PipelineError::io("x.xlsx", std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(PipelineSeverity::of(&io), PipelineSeverity::Critical);
        let layout = PipelineError::MissingSheet {
            sheet: "s".to_string(),
            available: vec![],
        };
        assert_eq!(PipelineSeverity::of(&layout), PipelineSeverity::Error);
        assert!(PipelineSeverity::Critical > PipelineSeverity::Error);
    }

    #[test]
    fn event_lines() {
        let ctx = mapping_ctx();
        let err = missing_code_column();
        assert_eq!(
            EventLine::Ok {
                ctx: &ctx,
                stats: StageStats { rows: 14 }
            }
            .to_string(),
            "stage=LoadGroupsMapping path=extras/cpi_groups_names_codes.csv ok rows=14"
        );
        let failed = EventLine::Failed {
            ctx: &ctx,
            severity: PipelineSeverity::Error,
            error: &err,
            alert: false,
        };
        assert!(failed
            .to_string()
            .starts_with("stage=LoadGroupsMapping path=extras/cpi_groups_names_codes.csv failed severity=Error: "));
        assert!(failed.to_string().contains("missing required column 'code_good_service'"));
    }

    #[test]
    fn composite_fans_out_to_file_and_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("events.log");
        let observers: Vec<Arc<dyn PipelineObserver>> =
            vec![Arc::new(StdErrObserver), Arc::new(FileObserver::new(&log))];
        let composite = CompositeObserver::new(observers);
        assert_eq!(composite.len(), 2);

        let ctx = mapping_ctx();
        composite.on_stage(&ctx, StageStats { rows: 14 });
        composite.on_alert(&ctx, PipelineSeverity::Error, &missing_code_column());

        let written = std::fs::read_to_string(&log).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);

        let (stamp, event) = lines[0].split_once(' ').unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok(), "{stamp}");
        assert_eq!(event, "stage=LoadGroupsMapping path=extras/cpi_groups_names_codes.csv ok rows=14");
        assert!(lines[1].contains("stage=LoadGroupsMapping path=extras/cpi_groups_names_codes.csv ALERT severity=Error: "));
        assert!(lines[1].contains("missing required column 'code_good_service'"));
    }

    #[test]
    fn unwritable_event_log_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let observer = FileObserver::new(dir.path());
        observer.on_stage(&mapping_ctx(), StageStats { rows: 1 });
        assert!(dir.path().is_dir());
    }
}
