//! Index-backed lookups.

use crate::error::QueryResult;
use crate::types::{Dataset, Field, Record};

/// All records for `country` (case-insensitive, surrounding whitespace ignored), in source order.
///
/// An unknown country yields an empty vector, not an error.
pub fn search_by_country<'a>(dataset: &'a Dataset, country: &str) -> QueryResult<Vec<&'a Record>> {
    dataset.schema().require(Field::Country)?;
    Ok(dataset.records_for_country(country).collect())
}

/// All records with `start <= year <= end`, ascending by year, source order within a year.
///
/// Reversed bounds are swapped.
pub fn search_by_year_range(dataset: &Dataset, start: i64, end: i64) -> QueryResult<Vec<&Record>> {
    dataset.schema().require(Field::Year)?;
    Ok(dataset.records_for_years(start, end).collect())
}
