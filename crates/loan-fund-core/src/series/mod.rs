//! Time-series reconstruction for cash flows and portfolio evolution.
//!
//! Producers write period data as a flat array, as a map keyed by the
//! stringified period number, or split into `yearly` / `monthly`
//! sub-collections. [`to_series`] folds all of these into one ordered
//! `Vec<Period>`.

pub mod fields;
pub mod periods;
mod shape;
pub mod summary;

pub use periods::{cumulative, to_series, Granularity, Period, SeriesOptions};
pub use summary::{summarize, SeriesSummary};
