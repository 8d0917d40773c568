//! Group-and-rank queries.
//!
//! Grouping sums raw per-row values per country. Countries are grouped case-insensitively and
//! reported with the spelling of their first record. All sorts are stable: ties keep the order
//! in which the group (or record) first appeared in the source.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::error::QueryResult;
use crate::types::{country_key, Dataset, Field, Metric, Record};

use super::sort::compare_values;

/// Which end of a ranking to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankOrder {
    /// Largest values first.
    #[default]
    Highest,
    /// Smallest values first.
    Lowest,
}

/// One `(key, value)` row of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub key: String,
    pub value: f64,
}

impl RankedEntry {
    pub fn new(key: impl Into<String>, value: f64) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Countries ranked by their summed `extreme_weather_events`.
///
/// With `year = None` the sum runs over every year. `count = None` returns every country.
pub fn find_extreme_events(
    dataset: &Dataset,
    year: Option<i64>,
    count: Option<usize>,
    order: RankOrder,
) -> QueryResult<Vec<RankedEntry>> {
    rank_countries_by(dataset, &Metric::Core(Field::ExtremeWeatherEvents), year, count, order)
}

/// The records of one year with the largest `co2_emissions`, as `(country, co2)` pairs.
///
/// Records are not grouped: a country listed twice in a year can appear twice.
pub fn find_high_co2_emitters(
    dataset: &Dataset,
    year: i64,
    count: Option<usize>,
) -> QueryResult<Vec<RankedEntry>> {
    let schema = dataset.schema();
    schema.require(Field::Country)?;
    schema.require(Field::Year)?;
    schema.require(Field::Co2Emissions)?;

    let mut rows: Vec<&Record> = dataset.records_for_year(year).collect();
    rows.sort_by(|a, b| compare_values(b.co2_emissions, a.co2_emissions));
    Ok(truncate(rows, count)
        .into_iter()
        .map(|r| RankedEntry::new(r.country.clone(), r.co2_emissions))
        .collect())
}

/// Countries ranked by the sum of an arbitrary numeric column.
///
/// `metric` is resolved against the dataset schema (see [`crate::types::Schema::resolve_metric`]),
/// so extra columns such as `urbanization` or `deforestation` can be ranked too.
pub fn rank_metric_by_country(
    dataset: &Dataset,
    metric: &str,
    year: Option<i64>,
    count: Option<usize>,
    order: RankOrder,
) -> QueryResult<Vec<RankedEntry>> {
    let metric = dataset.schema().resolve_metric(metric)?;
    rank_countries_by(dataset, &metric, year, count, order)
}

fn rank_countries_by(
    dataset: &Dataset,
    metric: &Metric,
    year: Option<i64>,
    count: Option<usize>,
    order: RankOrder,
) -> QueryResult<Vec<RankedEntry>> {
    let schema = dataset.schema();
    schema.require(Field::Country)?;
    if let Metric::Core(field) = metric {
        schema.require(*field)?;
    }

    let mut totals = match year {
        Some(y) => {
            schema.require(Field::Year)?;
            sum_by_country(dataset.records_for_year(y), metric)
        }
        None => sum_by_country(dataset.records().iter(), metric),
    };

    sort_entries(&mut totals, order);
    Ok(truncate(totals, count))
}

/// Sum `metric` per country, keeping groups in order of first appearance.
pub(crate) fn sum_by_country<'a>(
    records: impl Iterator<Item = &'a Record>,
    metric: &Metric,
) -> Vec<RankedEntry> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<RankedEntry> = Vec::new();
    for r in records {
        let value = metric.value_of(r);
        match slots.get(&country_key(&r.country)) {
            Some(&i) => totals[i].value += value,
            None => {
                slots.insert(country_key(&r.country), totals.len());
                totals.push(RankedEntry::new(r.country.clone(), value));
            }
        }
    }
    totals
}

fn sort_entries(entries: &mut [RankedEntry], order: RankOrder) {
    entries.sort_by(|a, b| compare(a.value, b.value, order));
}

fn compare(a: f64, b: f64, order: RankOrder) -> Ordering {
    match order {
        RankOrder::Highest => compare_values(b, a),
        RankOrder::Lowest => compare_values(a, b),
    }
}

fn truncate<T>(mut items: Vec<T>, count: Option<usize>) -> Vec<T> {
    if let Some(n) = count {
        items.truncate(n);
    }
    items
}
