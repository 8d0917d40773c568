//! Stable record sorts.

use std::cmp::Ordering;

use crate::error::QueryResult;
use crate::types::{Dataset, Field, Metric, Record};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortOrder::Ascending
        } else {
            SortOrder::Descending
        }
    }
}

/// Every record ordered by `temperature_anomaly`.
///
/// Records with equal anomalies keep their source order in both directions.
pub fn sort_by_temperature_anomaly(dataset: &Dataset, order: SortOrder) -> QueryResult<Vec<&Record>> {
    dataset.schema().require(Field::TemperatureAnomaly)?;
    let mut rows: Vec<&Record> = dataset.records().iter().collect();
    sort_records(&mut rows, &Metric::Core(Field::TemperatureAnomaly), order);
    Ok(rows)
}

/// The records of one year ordered by `gdp`.
pub fn sort_by_gdp(dataset: &Dataset, year: i64, order: SortOrder) -> QueryResult<Vec<&Record>> {
    let schema = dataset.schema();
    schema.require(Field::Year)?;
    schema.require(Field::Gdp)?;
    let mut rows: Vec<&Record> = dataset.records_for_year(year).collect();
    sort_records(&mut rows, &Metric::Core(Field::Gdp), order);
    Ok(rows)
}

/// Records ordered by any numeric column, optionally restricted to one year.
pub fn sort_by_metric<'a>(
    dataset: &'a Dataset,
    metric: &str,
    year: Option<i64>,
    order: SortOrder,
) -> QueryResult<Vec<&'a Record>> {
    let metric = dataset.schema().resolve_metric(metric)?;
    let mut rows: Vec<&Record> = match year {
        Some(y) => {
            dataset.schema().require(Field::Year)?;
            dataset.records_for_year(y).collect()
        }
        None => dataset.records().iter().collect(),
    };
    sort_records(&mut rows, &metric, order);
    Ok(rows)
}

/// Stable in-place sort of record references by `metric`.
pub fn sort_records(rows: &mut [&Record], metric: &Metric, order: SortOrder) {
    match order {
        SortOrder::Ascending => rows.sort_by(|a, b| compare_values(metric.value_of(a), metric.value_of(b))),
        SortOrder::Descending => rows.sort_by(|a, b| compare_values(metric.value_of(b), metric.value_of(a))),
    }
}

/// Total order over metric values in which `-0.0` and `0.0` tie.
pub(crate) fn compare_values(a: f64, b: f64) -> Ordering {
    (a + 0.0).total_cmp(&(b + 0.0))
}
