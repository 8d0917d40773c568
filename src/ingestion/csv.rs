//! CSV loading: one pass over the rows, building records and indexes as it goes.

use std::borrow::Cow;
use std::collections::HashSet;
use std::io::Read;

use crate::error::{LoadError, LoadResult};
use crate::types::{DataType, Dataset, Field, Record, Schema, SchemaColumn, Value};

use super::coerce;
use super::header::{canonicalize_header, detect_columns, normalize_header, resolve_field};
use super::loader::{HeaderMode, LoadOptions};

/// Counters collected during the row pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RowCounters {
    pub dropped_rows: usize,
    pub defaulted_cells: usize,
}

/// Where one source column's cells go.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ColumnTarget {
    Core(Field),
    Extra(String),
}

/// A CSV reader configured for this loader: headers required, ragged rows allowed.
pub fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true);
    builder
}

/// The row pass behind every load entrypoint.
///
/// - The first row is the header; an empty source is an error.
/// - Headers are resolved per [`LoadOptions::header_mode`]; unresolved headers become extra columns.
/// - Cells are coerced, never rejected: bad numbers become zero, invalid UTF-8 is replaced.
pub(crate) fn read_dataset<R: Read>(
    rdr: &mut csv::Reader<R>,
    options: &LoadOptions,
) -> LoadResult<(Dataset, RowCounters)> {
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(LoadError::EmptyInput {
            message: "source has no header row".to_string(),
        });
    }
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::InvalidHeader {
            message: format!("all {} column names are blank", headers.len()),
        });
    }

    let raw_headers: Vec<&str> = headers.iter().collect();
    let (schema, targets) = plan_columns(&raw_headers, options.header_mode);
    log_schema(&schema);

    let track_year = matches!(options.header_mode, HeaderMode::Detect);
    let mut dataset = Dataset::empty(schema);
    let mut counters = RowCounters::default();

    for result in rdr.byte_records() {
        let row = result?;
        let mut record = Record::default();
        let mut year_parsed = false;

        for (pos, target) in targets.iter().enumerate() {
            let raw: Option<Cow<'_, str>> = row.get(pos).map(String::from_utf8_lossy);
            let raw = raw.as_deref();
            match target {
                ColumnTarget::Core(field) => {
                    let (value, parsed) = match field.data_type() {
                        DataType::Utf8 => (Value::Utf8(coerce::clean_text(raw)), true),
                        DataType::Int64 => {
                            let v = coerce::parse_int(raw);
                            (Value::Int64(v.unwrap_or_default()), v.is_some())
                        }
                        DataType::Float64 => {
                            let v = coerce::parse_float(raw);
                            (Value::Float64(v.unwrap_or_default()), v.is_some())
                        }
                    };
                    if !parsed {
                        counters.defaulted_cells += 1;
                    }
                    if *field == Field::Year {
                        year_parsed = parsed;
                    }
                    record.set(*field, value);
                }
                ColumnTarget::Extra(name) => {
                    record.extra.insert(name.clone(), coerce::clean_text(raw));
                }
            }
        }

        if options.drop_incomplete_rows && (record.country.is_empty() || record.year == 0) {
            counters.dropped_rows += 1;
            continue;
        }

        // Detected schemas keep rows without a usable year out of the year index.
        let index_year = !track_year || year_parsed;
        dataset.push(record, index_year);
    }

    Ok((dataset, counters))
}

fn plan_columns(headers: &[&str], mode: HeaderMode) -> (Schema, Vec<ColumnTarget>) {
    let mut targets: Vec<Option<ColumnTarget>> = vec![None; headers.len()];

    match mode {
        HeaderMode::Aliases => {
            let mut claimed: HashSet<Field> = HashSet::new();
            for (pos, raw) in headers.iter().enumerate() {
                if let Some(field) = resolve_field(raw) {
                    if claimed.insert(field) {
                        targets[pos] = Some(ColumnTarget::Core(field));
                    }
                }
            }
        }
        HeaderMode::Detect => {
            for (field, pos) in detect_columns(headers) {
                targets[pos] = Some(ColumnTarget::Core(field));
            }
        }
    }

    let mut used: HashSet<String> = Field::ALL.iter().map(|f| f.name().to_string()).collect();
    let mut columns = Vec::with_capacity(headers.len());
    let targets: Vec<ColumnTarget> = targets
        .into_iter()
        .enumerate()
        .map(|(pos, target)| {
            let target = target.unwrap_or_else(|| {
                ColumnTarget::Extra(extra_name(headers[pos], pos, mode, &mut used))
            });
            let (name, field) = match &target {
                ColumnTarget::Core(field) => (field.name().to_string(), Some(*field)),
                ColumnTarget::Extra(name) => (name.clone(), None),
            };
            columns.push(SchemaColumn {
                name,
                source: headers[pos].to_string(),
                position: pos,
                field,
            });
            target
        })
        .collect();

    (Schema::new(columns), targets)
}

/// Key for an extra column: the canonical header, falling back to the normalized header when
/// the canonical one names a core field that is already taken, then to a numeric suffix.
fn extra_name(raw: &str, pos: usize, mode: HeaderMode, used: &mut HashSet<String>) -> String {
    let canonical = canonicalize_header(raw);
    let base = if canonical.is_empty() {
        format!("column_{}", pos + 1)
    } else if used.contains(&canonical) && mode == HeaderMode::Aliases {
        normalize_header(raw)
    } else {
        canonical
    };

    let mut name = base.clone();
    let mut n = 2;
    while used.contains(&name) {
        name = format!("{base}_{n}");
        n += 1;
    }
    used.insert(name.clone());
    name
}

fn log_schema(schema: &Schema) {
    for col in schema.columns() {
        tracing::debug!(
            target: "climate::load",
            position = col.position,
            source = %col.source,
            canonical = %col.name,
            core = col.field.is_some(),
            "resolved header"
        );
    }
    let missing = schema.missing_fields();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|f| f.name()).collect();
        tracing::warn!(
            target: "climate::load",
            missing = ?names,
            "core fields not found in source headers; queries needing them will fail"
        );
    }
}
