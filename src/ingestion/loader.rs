//! Load entrypoint.
//!
//! Most callers should use [`load_from_path`], which reads a CSV file into an indexed in-memory
//! [`crate::types::Dataset`].
//!
//! - [`LoadOptions::header_mode`] selects alias-table canonicalization or dynamic detection.
//! - If a [`super::observability::LoadObserver`] is provided, success/failure/alerts are reported
//!   to it.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::error::LoadResult;
use crate::types::Dataset;

use super::csv::{read_dataset, reader_builder, RowCounters};
use super::observability::{LoadContext, LoadObserver, LoadSeverity, LoadStats};

/// How source headers are mapped onto canonical fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMode {
    /// Normalize each header and look it up in the fixed alias table (default).
    ///
    /// Core fields missing from the file default to zero for every record.
    #[default]
    Aliases,
    /// Locate core fields by exact name, then by substring, in the raw header list.
    ///
    /// Rows whose year is missing or unparseable are kept but not added to the year index.
    Detect,
}

/// Options controlling load behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoadOptions {
    pub header_mode: HeaderMode,
    /// Skip rows whose country is empty or whose year is missing/zero.
    pub drop_incomplete_rows: bool,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("header_mode", &self.header_mode)
            .field("drop_incomplete_rows", &self.drop_incomplete_rows)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            header_mode: HeaderMode::default(),
            drop_incomplete_rows: false,
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

/// Load a CSV file with default options.
pub fn load(path: impl AsRef<Path>) -> LoadResult<Dataset> {
    load_from_path(path, &LoadOptions::default())
}

/// Load a CSV file into a [`Dataset`].
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with [`LoadStats`]
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use climate_data_processing::ingestion::{load_from_path, HeaderMode, LoadOptions};
///
/// # fn main() -> Result<(), climate_data_processing::LoadError> {
/// let opts = LoadOptions {
///     header_mode: HeaderMode::Detect,
///     ..Default::default()
/// };
/// let ds = load_from_path("global_warming_dataset.csv", &opts)?;
/// println!("rows={}", ds.len());
/// # Ok(())
/// # }
/// ```
pub fn load_from_path(path: impl AsRef<Path>, options: &LoadOptions) -> LoadResult<Dataset> {
    let path = path.as_ref();
    let ctx = LoadContext {
        source: path.to_path_buf(),
        header_mode: options.header_mode,
    };
    let start = Instant::now();
    let result = std::fs::File::open(path)
        .map_err(Into::into)
        .and_then(|file| read_dataset(&mut reader_builder().from_reader(file), options));
    report(&ctx, start, result, options)
}

/// Load CSV data from any reader (in-memory buffers, stdin, ...).
pub fn load_from_reader<R: Read>(reader: R, options: &LoadOptions) -> LoadResult<Dataset> {
    let ctx = LoadContext {
        source: PathBuf::from("<reader>"),
        header_mode: options.header_mode,
    };
    let start = Instant::now();
    let result = read_dataset(&mut reader_builder().from_reader(reader), options);
    report(&ctx, start, result, options)
}

fn report(
    ctx: &LoadContext,
    start: Instant,
    result: LoadResult<(Dataset, RowCounters)>,
    options: &LoadOptions,
) -> LoadResult<Dataset> {
    let elapsed = start.elapsed();
    match result {
        Ok((ds, counters)) => {
            if let Some(obs) = options.observer.as_ref() {
                obs.on_success(ctx, stats_for(&ds, counters, elapsed));
            }
            Ok(ds)
        }
        Err(e) => {
            if let Some(obs) = options.observer.as_ref() {
                let sev = LoadSeverity::for_error(&e);
                obs.on_failure(ctx, sev, &e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(ctx, sev, &e);
                }
            }
            Err(e)
        }
    }
}

fn stats_for(ds: &Dataset, counters: RowCounters, elapsed: std::time::Duration) -> LoadStats {
    LoadStats {
        rows: ds.len(),
        dropped_rows: counters.dropped_rows,
        defaulted_cells: counters.defaulted_cells,
        countries: ds.countries().len(),
        years: ds.years().count(),
        elapsed,
    }
}

/// Owned load request, for callers that want to pass a load around before running it.
#[derive(Clone)]
pub struct LoadRequest {
    pub path: PathBuf,
    pub options: LoadOptions,
}

impl fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRequest")
            .field("path", &self.path)
            .field("options", &self.options)
            .finish()
    }
}

impl LoadRequest {
    /// Execute the request by calling [`load_from_path`].
    pub fn run(&self) -> LoadResult<Dataset> {
        load_from_path(&self.path, &self.options)
    }
}
