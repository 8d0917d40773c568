//! `climate-data-processing` loads a per-country, per-year table of climate and economic
//! indicators from CSV into an indexed in-memory [`types::Dataset`], and answers a fixed set of
//! analytical queries against it.
//!
//! The primary entrypoint is [`ingestion::load_from_path`]; queries live in [`processing`].
//!
//! ## What a load does
//!
//! **Header resolution.** Source headers do not need to match any fixed spelling. Each header is
//! folded into a snake_case token (`"CO2 Emissions (Mt)"` → `co2_emissions_mt`) and looked up in
//! an alias table, so `CO2`, `co2_emission` and `CO2 Emissions (Mt)` all land on the canonical
//! `co2_emissions` field. Alternatively [`ingestion::HeaderMode::Detect`] locates each core field
//! by exact name and then by substring (any header containing both `temperature` and `anomaly`).
//! Headers that match nothing are kept as extra columns.
//!
//! **Core fields:**
//!
//! - `country` (text), `year` (integer)
//! - `temperature_anomaly`, `co2_emissions`, `gdp`, `extreme_weather_events`, `population` (float)
//!
//! **Missing values.** Blank cells, `NA`, `N/A` and `null` (any case), and anything that does not
//! parse, become `0` / `0.0` / `""`. Every record always carries all seven core fields. Which
//! fields the file actually had is recorded in the dataset's [`types::Schema`]; queries that need
//! an absent field fail with [`QueryError::FieldMissing`] instead of reading the defaults.
//!
//! ## Quick example
//!
//! ```no_run
//! use climate_data_processing::ingestion::{load_from_path, LoadOptions};
//! use climate_data_processing::processing::{find_extreme_events, search_by_country, RankOrder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ds = load_from_path("data.csv", &LoadOptions::default())?;
//! println!("rows={}", ds.len());
//!
//! for r in search_by_country(&ds, "brazil")? {
//!     println!("{} {} {}", r.country, r.year, r.co2_emissions);
//! }
//!
//! // Top 5 countries by extreme weather events summed over all years.
//! for e in find_extreme_events(&ds, None, Some(5), RankOrder::Highest)? {
//!     println!("{} -> {}", e.key, e.value);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: load entrypoints, header canonicalization, cell coercion, load observers
//! - [`types`]: fields, values, records, schema and the indexed dataset
//! - [`processing`]: search, ranking, sorting and averaging queries
//! - [`error`]: load and query error types

pub mod error;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use error::{LoadError, LoadResult, QueryError, QueryResult};
pub use ingestion::{load, load_from_path, LoadOptions};
pub use types::{Dataset, Field, Record, Schema};
