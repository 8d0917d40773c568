//! Reductions and per-country averages.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::QueryResult;
use crate::types::{Dataset, Field, Metric, Record};

/// Built-in reduction operations over a single numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Count all rows.
    Count,
    /// Sum of values (zero for no rows).
    Sum,
    /// Minimum value.
    Min,
    /// Maximum value.
    Max,
    /// Arithmetic mean.
    Mean,
}

/// Reduce `metric` over the given records.
///
/// - `Count` and `Sum` always return a value (`0.0` for no rows).
/// - `Min`/`Max`/`Mean` return `None` when there are no rows.
pub fn reduce_records(records: &[&Record], metric: &Metric, op: ReduceOp) -> Option<f64> {
    let values = records.iter().map(|r| metric.value_of(r));
    match op {
        ReduceOp::Count => Some(records.len() as f64),
        ReduceOp::Sum => Some(values.sum()),
        ReduceOp::Min => values.reduce(f64::min),
        ReduceOp::Max => values.reduce(f64::max),
        ReduceOp::Mean => {
            if records.is_empty() {
                None
            } else {
                Some(values.sum::<f64>() / records.len() as f64)
            }
        }
    }
}

/// Reduce a column across the whole dataset.
///
/// `metric` is resolved against the schema, so an absent column is an error rather than a zero.
pub fn reduce(dataset: &Dataset, metric: &str, op: ReduceOp) -> QueryResult<Option<f64>> {
    let metric = dataset.schema().resolve_metric(metric)?;
    let rows: Vec<&Record> = dataset.records().iter().collect();
    Ok(reduce_records(&rows, &metric, op))
}

/// Mean of each requested metric over the records of `country`.
///
/// - Metric names go through the alias table (`"CO2 Emissions"` reports as `co2_emissions`).
/// - A metric the schema lacks fails the whole call with `FieldMissing`, even for an unknown
///   country.
/// - An unknown country returns `Ok(None)`; a known one always yields every requested key.
pub fn average_metrics<S: AsRef<str>>(
    dataset: &Dataset,
    country: &str,
    metrics: &[S],
) -> QueryResult<Option<BTreeMap<String, f64>>> {
    dataset.schema().require(Field::Country)?;
    let resolved = metrics
        .iter()
        .map(|m| dataset.schema().resolve_metric(m.as_ref()))
        .collect::<QueryResult<Vec<Metric>>>()?;

    let rows: Vec<&Record> = dataset.records_for_country(country).collect();
    if rows.is_empty() {
        return Ok(None);
    }

    Ok(Some(
        resolved
            .into_iter()
            .map(|metric| {
                let mean = reduce_records(&rows, &metric, ReduceOp::Mean).unwrap_or_default();
                (metric.name().to_string(), mean)
            })
            .collect(),
    ))
}

/// Average of one metric in a [`profile_metrics`] result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricAverage {
    /// Name as requested.
    pub metric: String,
    /// `None` when the dataset has no such column.
    pub average: Option<f64>,
}

/// Like [`average_metrics`], but a metric missing from the schema is reported per entry
/// (`average: None`) instead of failing the call. Used for optional columns such as
/// `urbanization` and `deforestation` that only some source files carry.
pub fn profile_metrics<S: AsRef<str>>(
    dataset: &Dataset,
    country: &str,
    metrics: &[S],
) -> QueryResult<Option<Vec<MetricAverage>>> {
    dataset.schema().require(Field::Country)?;
    let rows: Vec<&Record> = dataset.records_for_country(country).collect();
    if rows.is_empty() {
        return Ok(None);
    }

    Ok(Some(
        metrics
            .iter()
            .map(|m| MetricAverage {
                metric: m.as_ref().to_string(),
                average: dataset
                    .schema()
                    .resolve_metric(m.as_ref())
                    .ok()
                    .and_then(|metric| reduce_records(&rows, &metric, ReduceOp::Mean)),
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::types::{Schema, SchemaColumn};

    fn rec(country: &str, co2: f64, gdp: f64) -> Record {
        Record {
            country: country.to_string(),
            year: 2020,
            co2_emissions: co2,
            gdp,
            ..Default::default()
        }
    }

    fn sample() -> Dataset {
        Dataset::new(
            Schema::core(),
            vec![rec("USA", 100.0, 500.0), rec("USA", 110.0, 520.0), rec("China", 200.0, 400.0)],
        )
    }

    #[test]
    fn reduce_ops_over_dataset() {
        let ds = sample();
        assert_eq!(reduce(&ds, "co2", ReduceOp::Count).unwrap(), Some(3.0));
        assert_eq!(reduce(&ds, "co2", ReduceOp::Sum).unwrap(), Some(410.0));
        assert_eq!(reduce(&ds, "gdp", ReduceOp::Min).unwrap(), Some(400.0));
        assert_eq!(reduce(&ds, "gdp", ReduceOp::Max).unwrap(), Some(520.0));
        assert_eq!(reduce(&ds, "gdp", ReduceOp::Mean).unwrap(), Some(1420.0 / 3.0));
    }

    #[test]
    fn reduce_on_no_rows() {
        let ds = Dataset::new(Schema::core(), vec![]);
        assert_eq!(reduce(&ds, "gdp", ReduceOp::Sum).unwrap(), Some(0.0));
        assert_eq!(reduce(&ds, "gdp", ReduceOp::Max).unwrap(), None);
        assert_eq!(reduce(&ds, "gdp", ReduceOp::Mean).unwrap(), None);
    }

    #[test]
    fn reduce_returns_error_for_missing_column() {
        let ds = sample();
        assert_eq!(
            reduce(&ds, "sea_level", ReduceOp::Sum).unwrap_err(),
            QueryError::FieldMissing { field: "sea_level".into() }
        );
    }

    #[test]
    fn average_metrics_uses_canonical_keys() {
        let ds = sample();
        let got = average_metrics(&ds, "usa", &["CO2 Emissions", "gdp"]).unwrap().unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got["co2_emissions"], 105.0);
        assert_eq!(got["gdp"], 510.0);
    }

    #[test]
    fn average_metrics_distinguishes_unknown_country() {
        let ds = sample();
        assert_eq!(average_metrics(&ds, "Atlantis", &["gdp"]).unwrap(), None);

        let zeros = Dataset::new(Schema::core(), vec![rec("Nauru", 0.0, 0.0)]);
        let got = average_metrics(&zeros, "Nauru", &["gdp"]).unwrap().unwrap();
        assert_eq!(got["gdp"], 0.0);
    }

    #[test]
    fn profile_reports_absent_columns_per_metric() {
        let mut columns = Schema::core().columns().to_vec();
        columns.push(SchemaColumn {
            name: "urbanization".into(),
            source: "Urbanization".into(),
            position: 7,
            field: None,
        });
        let mut a = rec("Peru", 0.0, 0.0);
        a.extra.insert("urbanization".into(), "70".into());
        let mut b = rec("Peru", 0.0, 0.0);
        b.extra.insert("urbanization".into(), "80".into());
        let ds = Dataset::new(Schema::new(columns), vec![a, b]);

        let got = profile_metrics(&ds, "PERU", &["urbanization", "deforestation"]).unwrap().unwrap();
        assert_eq!(
            got,
            vec![
                MetricAverage { metric: "urbanization".into(), average: Some(75.0) },
                MetricAverage { metric: "deforestation".into(), average: None },
            ]
        );
        assert_eq!(profile_metrics(&ds, "Chile", &["urbanization"]).unwrap(), None);
    }
}
