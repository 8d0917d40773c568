//! Core data model: canonical fields, typed values, normalized records and the indexed
//! in-memory [`Dataset`].
//!
//! Every [`Record`] carries all seven core fields after load. Which of them were actually found
//! in the source file is recorded separately in the dataset's [`Schema`], so queries can refuse
//! to run on a field the file never had instead of silently reading defaults.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::error::{QueryError, QueryResult};
use crate::ingestion::coerce;
use crate::ingestion::header::{canonicalize_header, normalize_header};

/// Logical data type of a canonical field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// UTF-8 string.
    Utf8,
}

impl DataType {
    /// Declared type for a canonical identifier. Anything that is not a core field is text.
    pub fn for_canonical(name: &str) -> Self {
        Field::from_name(name)
            .map(Field::data_type)
            .unwrap_or(DataType::Utf8)
    }
}

/// The seven core fields every [`Record`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Country,
    Year,
    TemperatureAnomaly,
    Co2Emissions,
    Gdp,
    ExtremeWeatherEvents,
    Population,
}

impl Field {
    /// All core fields in canonical column order.
    pub const ALL: [Field; 7] = [
        Field::Country,
        Field::Year,
        Field::TemperatureAnomaly,
        Field::Co2Emissions,
        Field::Gdp,
        Field::ExtremeWeatherEvents,
        Field::Population,
    ];

    /// Canonical identifier of the field.
    pub fn name(self) -> &'static str {
        match self {
            Field::Country => "country",
            Field::Year => "year",
            Field::TemperatureAnomaly => "temperature_anomaly",
            Field::Co2Emissions => "co2_emissions",
            Field::Gdp => "gdp",
            Field::ExtremeWeatherEvents => "extreme_weather_events",
            Field::Population => "population",
        }
    }

    /// Declared value type of the field.
    pub fn data_type(self) -> DataType {
        match self {
            Field::Country => DataType::Utf8,
            Field::Year => DataType::Int64,
            _ => DataType::Float64,
        }
    }

    /// Look up a field by its exact canonical identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn is_numeric(self) -> bool {
        self.data_type() != DataType::Utf8
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single typed cell value produced by the coercer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// UTF-8 string (trimmed, internal whitespace collapsed).
    Utf8(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Utf8(_) => None,
        }
    }
}

/// One fully normalized row of the source table.
///
/// Unmapped source columns survive in [`Record::extra`], keyed by their canonicalized header.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Record {
    pub country: String,
    pub year: i64,
    pub temperature_anomaly: f64,
    pub co2_emissions: f64,
    pub gdp: f64,
    pub extreme_weather_events: f64,
    pub population: f64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Record {
    /// Typed value of a core field.
    pub fn value(&self, field: Field) -> Value {
        match field {
            Field::Country => Value::Utf8(self.country.clone()),
            Field::Year => Value::Int64(self.year),
            Field::TemperatureAnomaly => Value::Float64(self.temperature_anomaly),
            Field::Co2Emissions => Value::Float64(self.co2_emissions),
            Field::Gdp => Value::Float64(self.gdp),
            Field::ExtremeWeatherEvents => Value::Float64(self.extreme_weather_events),
            Field::Population => Value::Float64(self.population),
        }
    }

    /// Numeric value of a core field; `None` for `country`.
    pub fn numeric(&self, field: Field) -> Option<f64> {
        match field {
            Field::Country => None,
            Field::Year => Some(self.year as f64),
            Field::TemperatureAnomaly => Some(self.temperature_anomaly),
            Field::Co2Emissions => Some(self.co2_emissions),
            Field::Gdp => Some(self.gdp),
            Field::ExtremeWeatherEvents => Some(self.extreme_weather_events),
            Field::Population => Some(self.population),
        }
    }

    /// Raw (cleaned) text of an extra column.
    pub fn extra(&self, name: &str) -> Option<&str> {
        self.extra.get(name).map(String::as_str)
    }

    pub(crate) fn set(&mut self, field: Field, value: Value) {
        match (field, value) {
            (Field::Country, Value::Utf8(s)) => self.country = s,
            (Field::Year, v) => self.year = v.as_i64().unwrap_or_default(),
            (Field::Country, _) => self.country.clear(),
            (field, v) => {
                let v = v.as_f64().unwrap_or_default();
                match field {
                    Field::TemperatureAnomaly => self.temperature_anomaly = v,
                    Field::Co2Emissions => self.co2_emissions = v,
                    Field::Gdp => self.gdp = v,
                    Field::ExtremeWeatherEvents => self.extreme_weather_events = v,
                    Field::Population => self.population = v,
                    Field::Country | Field::Year => {}
                }
            }
        }
    }
}

/// One column located in the source header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    /// Canonical identifier (core field name or canonicalized extra column name).
    pub name: String,
    /// Header text exactly as found in the source file.
    pub source: String,
    /// Zero-based column position in the source file.
    pub position: usize,
    /// Set when the column feeds one of the core fields.
    pub field: Option<Field>,
}

/// Which canonical fields a dataset's source file actually provided.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<SchemaColumn>,
}

impl Schema {
    pub fn new(columns: Vec<SchemaColumn>) -> Self {
        Self { columns }
    }

    /// Schema in which every core field is present, named canonically.
    pub fn core() -> Self {
        Self::new(
            Field::ALL
                .into_iter()
                .enumerate()
                .map(|(position, field)| SchemaColumn {
                    name: field.name().to_string(),
                    source: field.name().to_string(),
                    position,
                    field: Some(field),
                })
                .collect(),
        )
    }

    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    /// The source header a core field was read from, if any.
    pub fn source_of(&self, field: Field) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.field == Some(field))
            .map(|c| c.source.as_str())
    }

    pub fn contains(&self, field: Field) -> bool {
        self.columns.iter().any(|c| c.field == Some(field))
    }

    /// Fails with [`QueryError::FieldMissing`] if `field` was not found in the source file.
    pub fn require(&self, field: Field) -> QueryResult<()> {
        if self.contains(field) {
            Ok(())
        } else {
            Err(QueryError::field_missing(field.name()))
        }
    }

    /// Core fields absent from the source file.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !self.contains(*f))
            .collect()
    }

    /// Columns that do not map to a core field.
    pub fn extra_columns(&self) -> impl Iterator<Item = &SchemaColumn> {
        self.columns.iter().filter(|c| c.field.is_none())
    }

    /// Resolve a user-facing metric name to a numeric column.
    ///
    /// Resolution order: core field via the alias table, extra column by canonical name, extra
    /// column by case-insensitive source header, then the first extra column whose canonical name
    /// contains the requested one (so `urbanization` finds `urbanization_rate_pct`).
    pub fn resolve_metric(&self, name: &str) -> QueryResult<Metric> {
        let canonical = canonicalize_header(name);
        if let Some(field) = Field::from_name(&canonical) {
            if !field.is_numeric() {
                return Err(QueryError::NonNumericField {
                    field: field.name().to_string(),
                });
            }
            self.require(field)?;
            return Ok(Metric::Core(field));
        }

        let trimmed = name.trim();
        let normalized = normalize_header(name);
        let found = self
            .extra_columns()
            .find(|c| c.name == canonical)
            .or_else(|| {
                self.extra_columns()
                    .find(|c| c.source.trim().eq_ignore_ascii_case(trimmed))
            })
            .or_else(|| {
                (!normalized.is_empty())
                    .then(|| self.extra_columns().find(|c| c.name.contains(&normalized)))
                    .flatten()
            });

        match found {
            Some(col) => Ok(Metric::Extra(col.name.clone())),
            None => Err(QueryError::field_missing(canonical)),
        }
    }
}

/// A numeric column that queries can read from every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metric {
    Core(Field),
    /// Extra column, coerced with the float rules at read time.
    Extra(String),
}

impl Metric {
    pub fn name(&self) -> &str {
        match self {
            Metric::Core(field) => field.name(),
            Metric::Extra(name) => name,
        }
    }

    pub fn value_of(&self, record: &Record) -> f64 {
        match self {
            Metric::Core(field) => record.numeric(*field).unwrap_or_default(),
            Metric::Extra(name) => coerce::coerce_float(record.extra(name)),
        }
    }
}

/// In-memory dataset: records in source order plus country and year indexes.
///
/// Index entries are positions into the record sequence, so every index view refers to the
/// same records as [`Dataset::records`]. There is no mutation API once the dataset is built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    schema: Schema,
    records: Vec<Record>,
    by_country: HashMap<String, Vec<usize>>,
    by_year: BTreeMap<i64, Vec<usize>>,
}

impl Dataset {
    /// Build a dataset from already-normalized records, indexing every record.
    pub fn new(schema: Schema, records: Vec<Record>) -> Self {
        let mut ds = Self::empty(schema);
        for record in records {
            ds.push(record, true);
        }
        ds
    }

    pub(crate) fn empty(schema: Schema) -> Self {
        Self {
            schema,
            ..Default::default()
        }
    }

    /// Append a record. Empty countries are never indexed; `index_year = false` keeps the
    /// record out of the year index.
    pub(crate) fn push(&mut self, record: Record, index_year: bool) {
        let pos = self.records.len();
        let key = country_key(&record.country);
        if !key.is_empty() {
            self.by_country.entry(key).or_default().push(pos);
        }
        if index_year {
            self.by_year.entry(record.year).or_default().push(pos);
        }
        self.records.push(record);
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// All records in source order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records for a country (case-insensitive), in source order.
    pub fn records_for_country<'a>(
        &'a self,
        country: &str,
    ) -> impl Iterator<Item = &'a Record> + use<'a> {
        self.resolve(self.by_country.get(&country_key(country)))
    }

    /// Records for one year, in source order.
    pub fn records_for_year(&self, year: i64) -> impl Iterator<Item = &Record> {
        self.resolve(self.by_year.get(&year))
    }

    /// Records for every year in `start..=end`, ascending by year, source order within a year.
    pub fn records_for_years(&self, start: i64, end: i64) -> impl Iterator<Item = &Record> {
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        self.by_year
            .range(lo..=hi)
            .flat_map(|(_, positions)| positions.iter().map(|&i| &self.records[i]))
    }

    /// Distinct lower-cased country keys, sorted.
    pub fn countries(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.by_country.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Distinct indexed years, ascending.
    pub fn years(&self) -> impl Iterator<Item = i64> + '_ {
        self.by_year.keys().copied()
    }

    fn resolve<'a>(
        &'a self,
        positions: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a Record> + use<'a> {
        positions
            .into_iter()
            .flatten()
            .map(|&i| &self.records[i])
    }
}

/// Index key for a country name.
pub fn country_key(country: &str) -> String {
    country.trim().to_lowercase()
}
