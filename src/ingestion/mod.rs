//! Load entrypoints and the pieces they are built from.
//!
//! Most callers should use [`load_from_path`] (from [`loader`]) which:
//!
//! - reads the header row and resolves it per [`HeaderMode`]
//! - canonicalizes and coerces every cell into a [`crate::types::Record`] in one pass
//! - builds the country and year indexes
//! - optionally reports success/failure/alerts to a [`LoadObserver`]
//!
//! The building blocks are also public:
//! - [`header`]: header canonicalization and dynamic column detection
//! - [`coerce`]: raw cell to typed value coercion
//! - [`csv`]: the row pass over a `csv::Reader`

pub mod coerce;
pub mod csv;
pub mod header;
pub mod loader;
pub mod observability;

pub use loader::{load, load_from_path, load_from_reader, HeaderMode, LoadOptions, LoadRequest};
pub use observability::{
    CompositeObserver, FileObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats, TracingObserver,
};
