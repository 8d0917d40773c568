//! Query and aggregation engine.
//!
//! Every operation is a pure function of a loaded [`crate::types::Dataset`]: nothing here mutates
//! the dataset, and results borrow records rather than copying them.
//!
//! - [`search`]: index-backed lookups by country and by year range
//! - [`rank`]: per-country sums ranked highest/lowest, and per-year top CO2 emitters
//! - [`sort`]: stable sorts by temperature anomaly, GDP, or any numeric column
//! - [`reduce`]: count/sum/min/max/mean reductions and per-country averages
//!
//! Operations check the dataset [`crate::types::Schema`] first and fail with
//! [`crate::QueryError::FieldMissing`] when the source file never had a column they need.
//! A query that simply matches nothing returns an empty result (or `None` for averages).
//!
//! ## Example
//!
//! ```rust
//! use climate_data_processing::ingestion::{load_from_reader, LoadOptions};
//! use climate_data_processing::processing::{average_metrics, find_high_co2_emitters};
//!
//! let csv = "Country,Year,CO2 Emissions,GDP\nUSA,2020,100,500\nUSA,2021,110,520\nChina,2020,200,400\n";
//! let ds = load_from_reader(csv.as_bytes(), &LoadOptions::default()).unwrap();
//!
//! let top = find_high_co2_emitters(&ds, 2020, Some(2)).unwrap();
//! assert_eq!(top[0].key, "China");
//! assert_eq!(top[1].value, 100.0);
//!
//! let avg = average_metrics(&ds, "usa", &["co2"]).unwrap().unwrap();
//! assert_eq!(avg["co2_emissions"], 105.0);
//! ```

pub mod rank;
pub mod reduce;
pub mod search;
pub mod sort;

pub use rank::{find_extreme_events, find_high_co2_emitters, rank_metric_by_country, RankOrder, RankedEntry};
pub use reduce::{average_metrics, profile_metrics, reduce, reduce_records, MetricAverage, ReduceOp};
pub use search::{search_by_country, search_by_year_range};
pub use sort::{sort_by_gdp, sort_by_metric, sort_by_temperature_anomaly, sort_records, SortOrder};
