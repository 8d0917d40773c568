use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::LoadError;

use super::loader::HeaderMode;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (load failed).
    Error,
    /// Critical error (the source could not be opened or read).
    Critical,
}

impl LoadSeverity {
    /// Severity of a failed load.
    pub fn for_error(error: &LoadError) -> Self {
        match error {
            LoadError::Io(_) => LoadSeverity::Critical,
            LoadError::Csv(err) => match err.kind() {
                csv::ErrorKind::Io(_) => LoadSeverity::Critical,
                _ => LoadSeverity::Error,
            },
            LoadError::EmptyInput { .. } | LoadError::InvalidHeader { .. } => LoadSeverity::Error,
        }
    }
}

/// Context about a load attempt.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// Path of the source file, or a label such as `<reader>` for in-memory sources.
    pub source: PathBuf,
    /// How headers were resolved.
    pub header_mode: HeaderMode,
}

/// Stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadStats {
    /// Records in the dataset.
    pub rows: usize,
    /// Rows skipped by the incomplete-row filter.
    pub dropped_rows: usize,
    /// Numeric cells that fell back to their zero default (missing or unparseable).
    pub defaulted_cells: usize,
    /// Distinct countries in the country index.
    pub countries: usize,
    /// Distinct years in the year index.
    pub years: usize,
    /// Wall time of the load pass.
    pub elapsed: Duration,
}

/// Receives the outcome of each dataset load.
///
/// A load reports exactly one of `on_success` (with [`LoadStats`]) or `on_failure`, plus
/// `on_alert` when the failure's severity reaches [`crate::ingestion::LoadOptions::alert_at_or_above`].
pub trait LoadObserver: Send + Sync {
    /// Called when a load succeeds.
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    /// Called when a load fails.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &LoadError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Forwards every load event to each wrapped observer, in order.
///
/// The `climate-query` binary uses this to pair the [`TracingObserver`] with an optional
/// [`FileObserver`] from `--log-file`.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits load events as `tracing` events under the `climate::load` target.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        tracing::info!(
            target: "climate::load",
            source = %ctx.source.display(),
            mode = ?ctx.header_mode,
            rows = stats.rows,
            dropped = stats.dropped_rows,
            defaulted_cells = stats.defaulted_cells,
            countries = stats.countries,
            years = stats.years,
            elapsed_ms = stats.elapsed.as_secs_f64() * 1e3,
            "dataset loaded"
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        tracing::error!(
            target: "climate::load",
            source = %ctx.source.display(),
            severity = ?severity,
            %error,
            "dataset load failed"
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        tracing::error!(
            target: "climate::load",
            alert = true,
            source = %ctx.source.display(),
            severity = ?severity,
            %error,
            "dataset load failed"
        );
    }
}

/// Appends one line per load event to a log file.
///
/// Lines start with a unix timestamp, then `ok`, `fail` or `ALERT`:
///
/// - `ok` lines carry the header mode, source, record count, rows dropped by the incomplete-row
///   filter, numeric cells that fell back to zero, and the load time in milliseconds
/// - `fail` / `ALERT` lines carry the [`LoadSeverity`], header mode, source and error text
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// The file is created on first write. A log file that cannot be opened or written never
    /// fails the load.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.append_line(&format!(
            "{} ok mode={:?} source={} rows={} dropped={} defaulted_cells={} elapsed_ms={:.3}",
            unix_ts(),
            ctx.header_mode,
            ctx.source.display(),
            stats.rows,
            stats.dropped_rows,
            stats.defaulted_cells,
            stats.elapsed.as_secs_f64() * 1e3
        ));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.append_line(&format!(
            "{} fail severity={:?} mode={:?} source={} err={}",
            unix_ts(),
            severity,
            ctx.header_mode,
            ctx.source.display(),
            error
        ));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoadError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} mode={:?} source={} err={}",
            unix_ts(),
            severity,
            ctx.header_mode,
            ctx.source.display(),
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
